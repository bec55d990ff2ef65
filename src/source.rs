//! Structural extractor.
//!
//! Parses a component definition file and recovers its public
//! interface: the external selector from the `@Component` decorator,
//! `@Input` properties with declared types, defaults, and closed
//! string-literal sets, and `@Output` properties with their emitter
//! payload types.
//!
//! Extraction is a pure read. A missing file or a file without a
//! component marker is reported as "no data" and logged; the caller
//! skips the unit.

use crate::error::Result;
use crate::record::{EventDescriptor, PropertyDescriptor, VOID_PAYLOAD};
use crate::ts::{find_descendant, node_text, parse, strip_quotes};
use std::path::Path;
use tree_sitter::Node;

/// Public interface recovered from a component definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceApi {
    /// Selector string from the component marker, quotes stripped.
    pub selector: String,

    /// Properties annotated as inputs, in declaration order.
    pub inputs: Vec<PropertyDescriptor>,

    /// Properties annotated as outputs, in declaration order.
    pub outputs: Vec<EventDescriptor>,
}

/// Reads and analyzes a component definition file.
///
/// Returns `None` when the file is unreadable or contains no component
/// declaration; both cases are logged and non-fatal.
pub async fn extract_component(path: &Path) -> Option<SourceApi> {
    let source = match tokio::fs::read_to_string(path).await {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Component file not readable at {}: {}", path.display(), e);
            return None;
        }
    };

    match extract_from_source(&source) {
        Ok(Some(api)) => Some(api),
        Ok(None) => {
            tracing::warn!("No component declaration found in {}", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Failed to analyze {}: {}", path.display(), e);
            None
        }
    }
}

/// Analyzes component source text.
///
/// # Errors
///
/// Returns an error only if the parser cannot be initialized; absent
/// structure yields `Ok(None)`.
pub(crate) fn extract_from_source(source: &str) -> Result<Option<SourceApi>> {
    let tree = parse(source)?;
    let root = tree.root_node();

    let Some(decorator) = find_component_decorator(root, source) else {
        return Ok(None);
    };
    let Some(class_node) = enclosing_class(decorator) else {
        return Ok(None);
    };

    let selector = decorator_selector(decorator, source).unwrap_or_default();

    let mut api = SourceApi {
        selector,
        ..SourceApi::default()
    };

    if let Some(body) = class_node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if !matches!(member.kind(), "public_field_definition" | "field_definition") {
                continue;
            }

            if has_decorator(member, "Input", source) {
                if let Some(input) = process_input(member, source) {
                    api.inputs.push(input);
                }
            }
            if has_decorator(member, "Output", source) {
                if let Some(output) = process_output(member, source) {
                    api.outputs.push(output);
                }
            }
        }
    }

    Ok(Some(api))
}

/// Finds the `@Component` decorator anywhere in the tree.
fn find_component_decorator<'tree>(node: Node<'tree>, source: &str) -> Option<Node<'tree>> {
    if node.kind() == "decorator" && decorator_name(node, source) == Some("Component") {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_component_decorator(child, source) {
            return Some(found);
        }
    }
    None
}

/// Returns the identifier a decorator applies, for `@Name` and `@Name(...)`.
fn decorator_name<'a>(decorator: Node<'_>, source: &'a str) -> Option<&'a str> {
    let inner = decorator.named_child(0)?;
    match inner.kind() {
        "call_expression" => inner
            .child_by_field_name("function")
            .map(|f| node_text(f, source)),
        "identifier" => Some(node_text(inner, source)),
        _ => None,
    }
}

/// Locates the class declaration the decorator belongs to.
fn enclosing_class(decorator: Node<'_>) -> Option<Node<'_>> {
    let parent = decorator.parent()?;
    if parent.kind() == "class_declaration" {
        return Some(parent);
    }
    find_descendant(parent, "class_declaration")
}

/// Reads the `selector` entry of the decorator's configuration object.
fn decorator_selector(decorator: Node<'_>, source: &str) -> Option<String> {
    let call = decorator.named_child(0)?;
    let arguments = call.child_by_field_name("arguments")?;
    let object = arguments.named_child(0)?;
    if object.kind() != "object" {
        return None;
    }

    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let key = entry.child_by_field_name("key")?;
        if strip_quotes(node_text(key, source)) != "selector" {
            continue;
        }
        let value = entry.child_by_field_name("value")?;
        return Some(strip_quotes(node_text(value, source)).to_string());
    }
    None
}

/// Returns true when the field carries a decorator with the given name.
fn has_decorator(field: Node<'_>, name: &str, source: &str) -> bool {
    let mut cursor = field.walk();
    field
        .children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .any(|d| decorator_name(d, source) == Some(name))
}

/// Builds an input descriptor from a decorated field.
fn process_input(field: Node<'_>, source: &str) -> Option<PropertyDescriptor> {
    let name = node_text(field.child_by_field_name("name")?, source).to_string();

    let type_node = field
        .child_by_field_name("type")
        .and_then(|annotation| annotation.named_child(0));

    let initializer = field.child_by_field_name("value");

    let declared_type = match type_node {
        Some(node) => node_text(node, source).to_string(),
        None => inferred_type(initializer, source).to_string(),
    };

    let allowed_values = type_node.and_then(|node| string_literal_union(node, source));
    let default_value = initializer.map(|node| node_text(node, source).to_string());

    Some(PropertyDescriptor {
        name,
        declared_type,
        description: None,
        default_value,
        allowed_values,
    })
}

/// Falls back to a primitive type name inferred from a literal initializer.
fn inferred_type(initializer: Option<Node<'_>>, _source: &str) -> &'static str {
    match initializer.map(|node| node.kind()) {
        Some("string" | "template_string") => "string",
        Some("number") => "number",
        Some("true" | "false") => "boolean",
        _ => "unknown",
    }
}

/// Extracts the closed set of string literal values from a union type.
///
/// Returns `Some` only when the type is a union composed entirely of
/// string literals; a single literal or a mixed union yields `None`.
fn string_literal_union(type_node: Node<'_>, source: &str) -> Option<Vec<String>> {
    if type_node.kind() != "union_type" {
        return None;
    }

    let mut members = Vec::new();
    collect_union_members(type_node, &mut members);

    let mut values = Vec::with_capacity(members.len());
    for member in members {
        if member.kind() != "literal_type" {
            return None;
        }
        let literal = member.named_child(0)?;
        if literal.kind() != "string" {
            return None;
        }
        values.push(strip_quotes(node_text(literal, source)).to_string());
    }

    if values.is_empty() { None } else { Some(values) }
}

/// Flattens nested union nodes into their member types.
fn collect_union_members<'tree>(node: Node<'tree>, members: &mut Vec<Node<'tree>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "union_type" {
            collect_union_members(child, members);
        } else {
            members.push(child);
        }
    }
}

/// Builds an output descriptor from a decorated field.
///
/// The payload type comes from the emitter's generic argument, checked
/// first on the declared type and then on the initializer's
/// `new` expression; absent both, the void sentinel is used.
fn process_output(field: Node<'_>, source: &str) -> Option<EventDescriptor> {
    let name = node_text(field.child_by_field_name("name")?, source).to_string();

    let from_type = field
        .child_by_field_name("type")
        .and_then(|annotation| annotation.named_child(0))
        .and_then(|node| generic_argument(node, source));

    let from_value = field
        .child_by_field_name("value")
        .and_then(|value| find_descendant(value, "new_expression"))
        .and_then(|new_expr| new_expr.child_by_field_name("type_arguments"))
        .and_then(|args| args.named_child(0))
        .map(|node| node_text(node, source).to_string());

    let payload_type = from_type
        .or(from_value)
        .unwrap_or_else(|| VOID_PAYLOAD.to_string());

    Some(EventDescriptor { name, payload_type })
}

/// Reads the first type argument of a generic type annotation.
fn generic_argument(type_node: Node<'_>, source: &str) -> Option<String> {
    if type_node.kind() != "generic_type" {
        return None;
    }
    let arguments = type_node.child_by_field_name("type_arguments")?;
    let first = arguments.named_child(0)?;
    Some(node_text(first, source).to_string())
}
