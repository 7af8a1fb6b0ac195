
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SarvamClient;
use crate::config::GenerationConfig;
use crate::prompt::AssembledPrompt;
use crate::{ChatbotError, Result};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl SarvamClient {
    /// Send the assembled prompt to the chat-completions endpoint with the
    /// configured generation parameters and return the completion text
    /// verbatim (trimmed). Provider errors surface unmodified.
    #[inline]
    pub async fn chat_completion(
        &self,
        prompt: &AssembledPrompt,
        params: &GenerationConfig,
    ) -> Result<String> {
        debug!(
            "Requesting chat completion (model {}, max_tokens {})",
            params.model, params.max_tokens
        );

        let request = ChatCompletionRequest {
            model: &params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = self.endpoint("v1/chat/completions")?;
        let response = self
            .send_with_retry(|| Ok(self.http.post(url.clone()).json(&request)))
            .await?;

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatbotError::Other(anyhow!("Malformed chat completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatbotError::Other(anyhow!("Chat completion contained no choices")))?;

        Ok(content.trim().to_string())
    }
}
