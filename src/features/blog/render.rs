use anyhow::{Context, Result};
use serde_json::{Value, json};

pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

// the rendering collaborator: receives the context mapping and an abstract template
// identifier, what it does with them is its own business
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<Rendered>;
}

/// Emits the context as JSON, tagged with the template that would have rendered it.
/// Useful for a decoupled frontend and for tests.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<Rendered> {
        let body = serde_json::to_string(&json!({
            "template": template,
            "context": context,
        }))
        .with_context(|| format!("Failed to serialize context for {}", template))?;

        Ok(Rendered {
            content_type: "application/json",
            body,
        })
    }
}
