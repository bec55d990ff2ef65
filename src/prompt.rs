use crate::error::{Error, Result};
use tera::{Context, Tera};

const PROMPT_TEMPLATE: &str = "prompt";

/// Template engine for rendering the generation instruction.
///
/// The instruction embeds the knowledge base verbatim as the model's
/// context followed by the user's request; the template is compiled in
/// at build time.
pub(crate) struct PromptEngine {
    tera: Tera,
}

impl PromptEngine {
    /// Creates a new prompt engine.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub(crate) fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template(PROMPT_TEMPLATE, include_str!("../templates/prompt.tera"))
            .map_err(|e| Error::template(PROMPT_TEMPLATE, e))?;

        Ok(Self { tera })
    }

    /// Renders the final instruction from the knowledge-base JSON text
    /// and the user's request.
    ///
    /// Both values are inserted verbatim; no escaping is applied because
    /// the output is prose for a generation model, not markup.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render(&self, knowledge_base: &str, user_prompt: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("knowledge_base", knowledge_base);
        context.insert("user_prompt", user_prompt);

        self.tera
            .render(PROMPT_TEMPLATE, &context)
            .map_err(|e| Error::template(PROMPT_TEMPLATE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_both_values() {
        let engine = PromptEngine::new().unwrap();
        let rendered = engine
            .render(r#"[{"selector":"ui-badge"}]"#, "a warning badge")
            .unwrap();

        assert!(rendered.contains(r#"[{"selector":"ui-badge"}]"#));
        assert!(rendered.contains(r#""a warning badge""#));
    }

    #[test]
    fn test_render_preserves_json_verbatim() {
        // HTML-sensitive characters must survive unescaped.
        let engine = PromptEngine::new().unwrap();
        let rendered = engine
            .render(r#"[{"template":"<span>&</span>"}]"#, "x < y").unwrap();

        assert!(rendered.contains("<span>&</span>"));
        assert!(rendered.contains("x < y"));
    }
}
