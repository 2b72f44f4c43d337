use anyhow::Context as _;
use async_trait::async_trait;

use crate::genai::{GenerationRequest, TextModel, parse_error_message};
use crate::normalize::JsonShape;

pub fn responses_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/responses")
}

/// OpenAI Responses API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: responses_endpoint(base_url),
            api_key,
            model,
            temperature: 0.7,
        }
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        // json_object mode only accepts object roots; arrays stay plain text.
        let format = match request.expect {
            Some(JsonShape::Object) => "json_object",
            _ => "text",
        };
        let mut body = serde_json::json!({
            "model": self.model,
            "input": request.prompt,
            "text": { "format": { "type": format } },
            "store": false,
        });

        // NOTE: Some GPT-5 models reject sampling params like `temperature`.
        if !self.model.starts_with("gpt-5")
            && let Some(obj) = body.as_object_mut()
        {
            obj.insert(
                "temperature".to_owned(),
                serde_json::json!(self.temperature),
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = response.status();
        let raw = response.text().await.context("read OpenAI response body")?;
        if !status.is_success() {
            let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
            anyhow::bail!("OpenAI API error ({status}): {message}");
        }

        let value: serde_json::Value = serde_json::from_str(&raw).context("parse OpenAI response")?;
        extract_output_text(&value).context("extract output text")
    }
}

fn extract_output_text(value: &serde_json::Value) -> anyhow::Result<String> {
    let output = value
        .get("output")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("missing `output` array in response"))?;

    let mut text = String::new();
    for item in output {
        if item.get("type").and_then(|v| v.as_str()) != Some("message") {
            continue;
        }
        let Some(content) = item.get("content").and_then(|v| v.as_array()) else {
            continue;
        };
        for part in content {
            if part.get("type").and_then(|v| v.as_str()) != Some("output_text") {
                continue;
            }
            if let Some(part_text) = part.get("text").and_then(|v| v.as_str()) {
                text.push_str(part_text);
            }
        }
    }

    if text.trim().is_empty() {
        anyhow::bail!("OpenAI output text is empty");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        assert_eq!(
            responses_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/responses"
        );
    }

    #[test]
    fn output_text_concatenates_message_parts() -> anyhow::Result<()> {
        let value = serde_json::json!({
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "{\"titles\": "},
                    {"type": "output_text", "text": "[\"Dal\"]}"}
                ]}
            ]
        });
        assert_eq!(extract_output_text(&value)?, "{\"titles\": [\"Dal\"]}");
        Ok(())
    }

    #[test]
    fn empty_output_is_an_error() {
        let value = serde_json::json!({"output": []});
        assert!(extract_output_text(&value).is_err());
    }
}
