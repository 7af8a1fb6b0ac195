
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Language, SarvamClient};
use crate::{ChatbotError, Result};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'static str,
    target_language_code: &'static str,
    model: &'a str,
    mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: Option<String>,
}

impl SarvamClient {
    /// Translate text between languages. A same-language request
    /// short-circuits without touching the network.
    #[inline]
    pub async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String> {
        if source == target {
            return Ok(text.to_string());
        }

        debug!(
            "Translating {} -> {} (length {})",
            source.code(),
            target.code(),
            text.len()
        );

        let request = TranslateRequest {
            input: text,
            source_language_code: source.code(),
            target_language_code: target.code(),
            model: &self.translate_model,
            mode: "formal",
        };

        let url = self.endpoint("translate")?;
        let response = self
            .send_with_retry(|| Ok(self.http.post(url.clone()).json(&request)))
            .await?;

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ChatbotError::Other(anyhow!("Malformed translate response: {}", e)))?;

        // The provider omits translated_text for pass-through inputs
        Ok(parsed.translated_text.unwrap_or_else(|| text.to_string()))
    }
}
