use anyhow::Context as _;
use async_trait::async_trait;

use crate::genai::{GenerationRequest, TextModel, parse_error_message};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: model.trim_start_matches("models/").to_owned(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        let mut body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        });
        if request.expect.is_some()
            && let Some(obj) = body.as_object_mut()
        {
            obj.insert(
                "generationConfig".to_owned(),
                serde_json::json!({ "responseMimeType": "application/json" }),
            );
        }

        let endpoint = self.endpoint();
        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {endpoint}"))?;

        let status = response.status();
        let raw = response.text().await.context("read Gemini response body")?;
        if !status.is_success() {
            let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
            anyhow::bail!("Gemini API error ({status}): {message}");
        }

        let value: serde_json::Value = serde_json::from_str(&raw).context("parse Gemini response")?;
        extract_candidate_text(&value)
    }
}

fn extract_candidate_text(value: &serde_json::Value) -> anyhow::Result<String> {
    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("missing `candidates[0].content.parts` in response"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
        .collect();

    if text.trim().is_empty() {
        anyhow::bail!("Gemini output text is empty");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_prefix_is_dropped_from_endpoint() {
        let client = GeminiClient::new(
            reqwest::Client::new(),
            "http://localhost:1/v1beta/",
            "key".to_owned(),
            "models/gemini-2.5-flash".to_owned(),
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn candidate_text_joins_parts() -> anyhow::Result<()> {
        let value = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "[{\"day\":"}, {"text": "\"Day 1\"}]"}]}}]
        });
        assert_eq!(extract_candidate_text(&value)?, "[{\"day\":\"Day 1\"}]");
        Ok(())
    }

    #[test]
    fn blocked_prompt_without_candidates_is_an_error() {
        let value = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(extract_candidate_text(&value).is_err());
    }
}
