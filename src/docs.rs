//! Documentation extractor.
//!
//! Parses a component's conventionally-named documentation file
//! (`<directory-basename><doc suffix>`) into sectioned text. A cursor
//! tracks the active section; it changes on every heading, classified
//! by case-insensitive substring matching against a fixed vocabulary.
//! Body text outside any recognized section is discarded.

use crate::record::{DocumentationBlock, VariantDoc};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::path::Path;

/// The recognized documentation sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Running prose describing the component.
    GeneralDescription,
    /// Bullet list naming the component's parts.
    Anatomy,
    /// Named variant descriptions.
    Variants,
    /// Accessibility notes.
    Accessibility,
}

/// Classifies a heading into a section kind.
///
/// Matching is case-insensitive substring containment; unrecognized
/// headings deactivate the cursor so following body text is discarded.
#[must_use]
pub fn classify_heading(text: &str) -> Option<SectionKind> {
    let lower = text.to_lowercase();
    if lower.contains("description") {
        Some(SectionKind::GeneralDescription)
    } else if lower.contains("anatomy") {
        Some(SectionKind::Anatomy)
    } else if lower.contains("variant") {
        Some(SectionKind::Variants)
    } else if lower.contains("accessibility") {
        Some(SectionKind::Accessibility)
    } else {
        None
    }
}

/// Looks for the documentation file next to a component and extracts it.
///
/// A missing or unreadable file yields an empty block; never fatal.
pub async fn extract_docs(component_dir: &Path, doc_suffix: &str) -> DocumentationBlock {
    let Some(basename) = component_dir.file_name().and_then(|n| n.to_str()) else {
        return DocumentationBlock::default();
    };

    let doc_path = component_dir.join(format!("{basename}{doc_suffix}"));
    match tokio::fs::read_to_string(&doc_path).await {
        Ok(content) => extract_from_markdown(&content),
        Err(_) => {
            tracing::debug!("No documentation file at {}", doc_path.display());
            DocumentationBlock::default()
        }
    }
}

/// Which block-level element is currently accumulating text.
enum Accumulating {
    Idle,
    Heading(String),
    Paragraph(String),
    ListItem(String),
}

/// Extracts sectioned documentation from markdown text.
#[must_use]
pub fn extract_from_markdown(content: &str) -> DocumentationBlock {
    let mut doc = DocumentationBlock::default();
    let mut section: Option<SectionKind> = None;
    let mut state = Accumulating::Idle;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                state = Accumulating::Heading(String::new());
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Accumulating::Heading(text) = state {
                    section = classify_heading(&text);
                }
                state = Accumulating::Idle;
            }
            Event::Start(Tag::Item) => {
                state = Accumulating::ListItem(String::new());
            }
            Event::End(TagEnd::Item) => {
                if let Accumulating::ListItem(text) = state {
                    dispatch(&mut doc, section, &text);
                }
                state = Accumulating::Idle;
            }
            Event::Start(Tag::Paragraph) => {
                // A paragraph inside a list item keeps feeding the item.
                if !matches!(state, Accumulating::ListItem(_)) {
                    state = Accumulating::Paragraph(String::new());
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if let Accumulating::Paragraph(text) = state {
                    dispatch(&mut doc, section, &text);
                    state = Accumulating::Idle;
                }
            }
            Event::Text(text) | Event::Code(text) => match &mut state {
                Accumulating::Heading(buffer)
                | Accumulating::Paragraph(buffer)
                | Accumulating::ListItem(buffer) => buffer.push_str(&text),
                Accumulating::Idle => {}
            },
            Event::SoftBreak | Event::HardBreak => match &mut state {
                Accumulating::Heading(buffer)
                | Accumulating::Paragraph(buffer)
                | Accumulating::ListItem(buffer) => buffer.push(' '),
                Accumulating::Idle => {}
            },
            _ => {}
        }
    }

    doc.general_description = doc.general_description.trim().to_string();
    doc
}

/// Routes one flattened block of text into the active section.
fn dispatch(doc: &mut DocumentationBlock, section: Option<SectionKind>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    match section {
        Some(SectionKind::GeneralDescription) => {
            doc.general_description.push_str(text);
            doc.general_description.push(' ');
        }
        Some(SectionKind::Anatomy) => doc.anatomy.push(text.to_string()),
        Some(SectionKind::Accessibility) => doc.accessibility.push(text.to_string()),
        Some(SectionKind::Variants) => {
            // Only the structured `Name: description` list form counts.
            if let Some((name, description)) = text.split_once(':') {
                let name = name.trim();
                let description = description.trim();
                if !name.is_empty() && !description.is_empty() {
                    doc.variants.push(VariantDoc {
                        name: name.to_string(),
                        description: description.to_string(),
                    });
                }
            }
        }
        None => {}
    }
}
