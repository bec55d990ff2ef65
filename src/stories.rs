//! Example extractor.
//!
//! Parses a story file for the component's display name, optional AI
//! hint, per-property descriptions, and named example configurations.
//!
//! The parse is tolerant by construction: malformed syntax yields a
//! partial tree and extraction recovers whatever structure survives;
//! missing nodes simply produce empty results.

use crate::error::Result;
use crate::record::{AI_HINT_PLACEHOLDER, ExampleConfiguration};
use crate::ts::{node_text, parse, strip_quotes};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tree_sitter::Node;

/// Everything recovered from one story file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryData {
    /// Display name from the metadata title; empty when not found.
    pub name: String,

    /// Free-text model guidance; placeholder when the metadata has none.
    pub ai_hint: String,

    /// Property name to free-text description, from `argTypes`.
    pub descriptions: BTreeMap<String, String>,

    /// Named example configurations, in export order.
    pub examples: Vec<ExampleConfiguration>,
}

impl Default for StoryData {
    fn default() -> Self {
        Self {
            name: String::new(),
            ai_hint: AI_HINT_PLACEHOLDER.to_string(),
            descriptions: BTreeMap::new(),
            examples: Vec::new(),
        }
    }
}

/// Reads and analyzes a story file.
///
/// An unreadable file is logged and yields the empty result; it never
/// aborts the batch.
pub async fn extract_stories(path: &Path) -> StoryData {
    let source = match tokio::fs::read_to_string(path).await {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Story file not readable at {}: {}", path.display(), e);
            return StoryData::default();
        }
    };

    match extract_from_source(&source) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to analyze {}: {}", path.display(), e);
            StoryData::default()
        }
    }
}

/// Analyzes story source text.
///
/// # Errors
///
/// Returns an error only if the parser cannot be initialized.
pub(crate) fn extract_from_source(source: &str) -> Result<StoryData> {
    let tree = parse(source)?;
    let root = tree.root_node();

    let mut data = StoryData::default();

    collect_meta(root, source, &mut data);
    collect_examples(root, source, &mut data.examples);

    Ok(data)
}

/// Finds the `meta` declarator and reads its title, hint, and argTypes.
fn collect_meta(node: Node<'_>, source: &str, data: &mut StoryData) {
    if node.kind() == "variable_declarator" {
        let is_meta = node
            .child_by_field_name("name")
            .is_some_and(|name| name.kind() == "identifier" && node_text(name, source) == "meta");

        if is_meta {
            if let Some(object) = node
                .child_by_field_name("value")
                .filter(|value| value.kind() == "object")
            {
                read_meta_object(object, source, data);
                return;
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_meta(child, source, data);
    }
}

/// Reads `title`, `aiHint`, and `argTypes` entries of the meta object.
fn read_meta_object(object: Node<'_>, source: &str, data: &mut StoryData) {
    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let Some(key) = entry.child_by_field_name("key") else {
            continue;
        };
        let Some(value) = entry.child_by_field_name("value") else {
            continue;
        };

        match strip_quotes(node_text(key, source)) {
            "title" if value.kind() == "string" => {
                data.name = strip_quotes(node_text(value, source)).to_string();
            }
            "aiHint" if value.kind() == "string" => {
                data.ai_hint = strip_quotes(node_text(value, source)).to_string();
            }
            "argTypes" if value.kind() == "object" => {
                read_arg_types(value, source, &mut data.descriptions);
            }
            _ => {}
        }
    }
}

/// Reads per-property descriptions from an `argTypes`-shaped object.
fn read_arg_types(object: Node<'_>, source: &str, descriptions: &mut BTreeMap<String, String>) {
    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let Some(key) = entry.child_by_field_name("key") else {
            continue;
        };
        let Some(value) = entry
            .child_by_field_name("value")
            .filter(|value| value.kind() == "object")
        else {
            continue;
        };

        let property = strip_quotes(node_text(key, source)).to_string();

        let mut inner = value.walk();
        for field in value.named_children(&mut inner) {
            if field.kind() != "pair" {
                continue;
            }
            let is_description = field
                .child_by_field_name("key")
                .is_some_and(|k| strip_quotes(node_text(k, source)) == "description");
            if !is_description {
                continue;
            }
            if let Some(text) = field
                .child_by_field_name("value")
                .filter(|v| v.kind() == "string")
            {
                descriptions.insert(
                    property.clone(),
                    strip_quotes(node_text(text, source)).to_string(),
                );
            }
        }
    }
}

/// Collects every top-level named export whose initializer object
/// carries an `args` property.
fn collect_examples(root: Node<'_>, source: &str, examples: &mut Vec<ExampleConfiguration>) {
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "export_statement" {
            continue;
        }
        let Some(declaration) = statement
            .child_by_field_name("declaration")
            .filter(|d| d.kind() == "lexical_declaration")
        else {
            continue;
        };

        let mut decl_cursor = declaration.walk();
        for declarator in declaration.named_children(&mut decl_cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
            else {
                continue;
            };
            let Some(object) = declarator
                .child_by_field_name("value")
                .filter(|v| v.kind() == "object")
            else {
                continue;
            };

            if let Some(args) = object_entry(object, "args", source) {
                if let Value::Object(configuration) = literal_value(args, source) {
                    examples.push(ExampleConfiguration {
                        name: node_text(name, source).to_string(),
                        configuration,
                    });
                }
            }
        }
    }
}

/// Looks up an object literal entry by key.
fn object_entry<'tree>(object: Node<'tree>, key: &str, source: &str) -> Option<Node<'tree>> {
    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let matches = entry
            .child_by_field_name("key")
            .is_some_and(|k| strip_quotes(node_text(k, source)) == key);
        if matches {
            return entry.child_by_field_name("value");
        }
    }
    None
}

/// Deep-converts an expression into a plain literal value.
///
/// String, boolean, and numeric literals pass through; object literals
/// recurse; every other expression form becomes `null`.
fn literal_value(node: Node<'_>, source: &str) -> Value {
    match node.kind() {
        "string" => Value::String(strip_quotes(node_text(node, source)).to_string()),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "number" => parse_number(node_text(node, source)),
        "object" => {
            let mut map = Map::new();
            let mut cursor = node.walk();
            for entry in node.named_children(&mut cursor) {
                if entry.kind() != "pair" {
                    continue;
                }
                let Some(key) = entry.child_by_field_name("key") else {
                    continue;
                };
                let Some(value) = entry.child_by_field_name("value") else {
                    continue;
                };
                map.insert(
                    strip_quotes(node_text(key, source)).to_string(),
                    literal_value(value, source),
                );
            }
            Value::Object(map)
        }
        _ => Value::Null,
    }
}

/// Parses numeric literal text, preferring integer representation.
fn parse_number(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    match text.parse::<f64>() {
        Ok(float) => serde_json::Number::from_f64(float).map_or(Value::Null, Value::Number),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BADGE_STORIES: &str = r"
        import type { Meta, StoryObj } from '@storybook/angular';
        import { BadgeComponent } from '../components/badge.component';

        const meta: Meta<BadgeComponent> = {
          title: 'Badge',
          aiHint: 'Use for small status labels',
          component: BadgeComponent,
          argTypes: {
            variant: { description: 'Visual tone of the badge' },
            label: { description: 'Text rendered inside the badge' },
          },
        };
        export default meta;

        export const Default: StoryObj<BadgeComponent> = {
          args: { variant: 'info' },
        };

        export const Dismissible = {
          args: { variant: 'warning', dismissible: true, maxCount: 9 },
        };

        export const Empty = {
          parameters: { docs: false },
        };
    ";

    #[test]
    fn test_extracts_title() {
        let data = extract_from_source(BADGE_STORIES).unwrap();
        assert_eq!(data.name, "Badge");
    }

    #[test]
    fn test_extracts_ai_hint() {
        let data = extract_from_source(BADGE_STORIES).unwrap();
        assert_eq!(data.ai_hint, "Use for small status labels");
    }

    #[test]
    fn test_missing_ai_hint_defaults_to_placeholder() {
        let data = extract_from_source("const meta = { title: 'X' };").unwrap();
        assert_eq!(data.ai_hint, AI_HINT_PLACEHOLDER);
    }

    #[test]
    fn test_extracts_arg_type_descriptions() {
        let data = extract_from_source(BADGE_STORIES).unwrap();
        assert_eq!(
            data.descriptions.get("variant").map(String::as_str),
            Some("Visual tone of the badge")
        );
        assert_eq!(data.descriptions.len(), 2);
    }

    #[test]
    fn test_extracts_examples_with_args() {
        let data = extract_from_source(BADGE_STORIES).unwrap();
        let names: Vec<_> = data.examples.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Default", "Dismissible"]);

        assert_eq!(
            Value::Object(data.examples[0].configuration.clone()),
            json!({ "variant": "info" })
        );
        assert_eq!(
            Value::Object(data.examples[1].configuration.clone()),
            json!({ "variant": "warning", "dismissible": true, "maxCount": 9 })
        );
    }

    #[test]
    fn test_export_without_args_is_skipped() {
        let data = extract_from_source(BADGE_STORIES).unwrap();
        assert!(data.examples.iter().all(|e| e.name != "Empty"));
    }

    #[test]
    fn test_nested_objects_convert_recursively() {
        let source = r"
            export const Nested = {
              args: { layout: { direction: 'row', gap: 8 } },
            };
        ";
        let data = extract_from_source(source).unwrap();
        assert_eq!(
            Value::Object(data.examples[0].configuration.clone()),
            json!({ "layout": { "direction": "row", "gap": 8 } })
        );
    }

    #[test]
    fn test_non_literal_values_become_null() {
        let source = r"
            export const Computed = {
              args: { handler: () => {}, count: 1 + 2, label: 'ok' },
            };
        ";
        let data = extract_from_source(source).unwrap();
        assert_eq!(
            Value::Object(data.examples[0].configuration.clone()),
            json!({ "handler": null, "count": null, "label": "ok" })
        );
    }

    #[test]
    fn test_malformed_source_recovers_without_panicking() {
        // Unterminated string; tolerant parse must not abort the batch.
        let source = "const meta = { title: 'Badge };\nexport const Broken = {";
        let data = extract_from_source(source).unwrap();
        assert!(data.examples.is_empty());
    }

    #[test]
    fn test_missing_meta_yields_empty_name() {
        let data = extract_from_source("export const X = { args: {} };").unwrap();
        assert!(data.name.is_empty());
        assert_eq!(data.examples.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_result() {
        let data = extract_stories(Path::new("/nonexistent/x.stories.ts")).await;
        assert!(data.name.is_empty());
        assert!(data.examples.is_empty());
    }
}
