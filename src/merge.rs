//! Merges the three extraction results into one component record.
//!
//! The structural extraction is the backbone: a component only enters
//! the knowledge base when both its selector (from the source file) and
//! its display name (from the story metadata) were recovered. The other
//! inputs are purely additive.

use crate::record::{ComponentApi, ComponentRecord, DocumentationBlock};
use crate::source::SourceApi;
use crate::stories::StoryData;

/// Combines per-source extraction results into a record.
///
/// Returns `None` when the component fails the completeness gate, i.e.
/// when either the selector or the display name is missing.
#[must_use]
pub fn merge_component(
    source: SourceApi,
    stories: StoryData,
    documentation: DocumentationBlock,
) -> Option<ComponentRecord> {
    if source.selector.is_empty() || stories.name.is_empty() {
        return None;
    }

    let mut inputs = source.inputs;
    for input in &mut inputs {
        if let Some(description) = stories.descriptions.get(&input.name) {
            input.description = Some(description.clone());
        }
    }

    Some(ComponentRecord {
        name: stories.name,
        selector: source.selector,
        ai_hint: stories.ai_hint,
        api: ComponentApi {
            inputs,
            outputs: source.outputs,
        },
        documentation,
        examples: stories.examples,
    })
}
