use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel used for `aiHint` when the story metadata carries none.
pub const AI_HINT_PLACEHOLDER: &str = "FILL IN AI HINT";

/// Sentinel payload type for outputs whose emitter carries no type argument.
pub const VOID_PAYLOAD: &str = "void";

/// One normalized component record in the knowledge base.
///
/// Assembled once per discovered component per run and immutable
/// afterwards. Identified by `selector` within one knowledge base
/// (uniqueness is logged but not enforced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Display name taken from the story metadata title.
    pub name: String,

    /// External identifier (tag) by which consumers reference the component.
    pub selector: String,

    /// Free-text guidance for the generation model.
    pub ai_hint: String,

    /// Public interface recovered from the component source.
    pub api: ComponentApi,

    /// Sectioned prose documentation.
    pub documentation: DocumentationBlock,

    /// Named example configurations, in story-file order.
    pub examples: Vec<ExampleConfiguration>,
}

/// Inputs and outputs of a component's public interface.
///
/// Both lists may be empty but are never absent from the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentApi {
    /// Named inputs with types, defaults, and allowed values.
    pub inputs: Vec<PropertyDescriptor>,

    /// Named outputs with payload types.
    pub outputs: Vec<EventDescriptor>,
}

/// A single input property of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Property name as declared.
    pub name: String,

    /// Declared type text, verbatim and unresolved.
    pub declared_type: String,

    /// Free-text description merged in from the story `argTypes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Initializer source text, verbatim, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Closed set of literal string values, present only when the
    /// declared type is a union composed entirely of string literals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

/// A single output event of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescriptor {
    /// Event name as declared.
    pub name: String,

    /// Emitter payload type, or [`VOID_PAYLOAD`] when absent.
    pub payload_type: String,
}

/// Sectioned prose documentation for one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationBlock {
    /// Accumulated general description prose, trimmed.
    pub general_description: String,

    /// Ordered anatomy bullet entries.
    pub anatomy: Vec<String>,

    /// Named variant descriptions; empty unless the doc carries the
    /// structured `Name: description` list form.
    pub variants: Vec<VariantDoc>,

    /// Ordered accessibility notes.
    pub accessibility: Vec<String>,
}

impl DocumentationBlock {
    /// Returns true when no section captured any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.general_description.is_empty()
            && self.anatomy.is_empty()
            && self.variants.is_empty()
            && self.accessibility.is_empty()
    }
}

/// One documented variant of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDoc {
    /// Variant name.
    pub name: String,

    /// Variant description.
    pub description: String,
}

/// One named example configuration from a story file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleConfiguration {
    /// The story export's identifier.
    pub name: String,

    /// Property-name to literal-value bag. Values are restricted to
    /// strings, booleans, numbers, and nested objects of the same;
    /// other expression forms are dropped to `null`.
    pub configuration: Map<String, Value>,
}
