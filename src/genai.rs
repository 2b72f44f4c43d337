use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::normalize::JsonShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelEngine {
    Gemini,
    Openai,
}

/// One prompt for the generative-text collaborator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Structured-output hint: the JSON value the prompt asks for.
    pub expect: Option<JsonShape>,
}

impl GenerationRequest {
    pub fn json(prompt: impl Into<String>, shape: JsonShape) -> Self {
        Self {
            prompt: prompt.into(),
            expect: Some(shape),
        }
    }
}

/// Free-text generation. The output carries no schema guarantee; callers run it
/// through [`crate::normalize::decode`].
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

pub(crate) fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_is_read_from_provider_envelope() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(parse_error_message(raw).as_deref(), Some("API key not valid"));
        assert_eq!(parse_error_message("<html>bad gateway</html>"), None);
    }
}
