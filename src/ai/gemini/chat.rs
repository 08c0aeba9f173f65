use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{CompletionService, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::models::AiProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: Option<ChatGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            http: GeminiHttpClient::new(api_key, model, timeout),
        }
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Concatenates the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        let content = response.candidates.into_iter().next()?.content?;
        let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!texts.is_empty()).then(|| texts.concat())
    }
}

#[async_trait]
impl CompletionService for GeminiChatClient {
    fn service_name(&self) -> &str {
        AiProvider::Gemini.as_str()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            system_instruction: Some(Content::text(None, system)),
            contents: vec![Content::text(Some("user"), user)],
            generation_config: Some(ChatGenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                temperature: Some(TEMPERATURE),
            }),
        };

        tracing::debug!("Sending generateContent request to Gemini ({})", self.http.model());
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Self::extract_text(response)
            .ok_or_else(|| Error::AiProvider("No text in Gemini chat response".to_string()))
    }
}
