// Sarvam AI client module
// Chat completions, translation, and speech endpoints behind one client

pub mod chat;
pub mod speech;
pub mod translate;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::{ApiKey, SarvamConfig};
use crate::{ChatbotError, Result};

const API_KEY_HEADER: &str = "api-subscription-key";
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Languages the chat surface offers, with their Sarvam BCP-47 codes.
/// English is the pivot language the corpus and the LLM operate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Bengali,
    Marathi,
    Gujarati,
    Punjabi,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Malayalam,
        Language::Bengali,
        Language::Marathi,
        Language::Gujarati,
        Language::Punjabi,
    ];

    #[inline]
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
            Language::Kannada => "kn-IN",
            Language::Malayalam => "ml-IN",
            Language::Bengali => "bn-IN",
            Language::Marathi => "mr-IN",
            Language::Gujarati => "gu-IN",
            Language::Punjabi => "pa-IN",
        }
    }

    /// Default Bulbul voice per language.
    #[inline]
    pub fn tts_voice(self) -> &'static str {
        match self {
            Language::English => "shubh",
            Language::Tamil => "abhilasha",
            _ => "anushka",
        }
    }

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Kannada => "Kannada",
            Language::Malayalam => "Malayalam",
            Language::Bengali => "Bengali",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Punjabi => "Punjabi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = ChatbotError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|language| language.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ChatbotError::Config(format!(
                    "Unknown language '{}'; supported: {}",
                    s,
                    Language::ALL.map(Language::label).join(", ")
                ))
            })
    }
}

/// HTTP client for the Sarvam API. One instance is constructed at startup
/// with the credential from the environment and passed to the pipeline.
#[derive(Debug, Clone)]
pub struct SarvamClient {
    http: reqwest::Client,
    base_url: Url,
    retry_attempts: u32,
    translate_model: String,
    stt_model: String,
    tts_model: String,
}

impl SarvamClient {
    #[inline]
    pub fn new(config: &SarvamConfig, api_key: &ApiKey) -> Result<Self> {
        let mut base_url = config
            .parsed_base_url()
            .map_err(|e| ChatbotError::Config(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key.expose())
            .map_err(|_| ChatbotError::Config("API key contains invalid characters".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| ChatbotError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            retry_attempts: config.retry_attempts.max(1),
            translate_model: config.translate_model.clone(),
            stt_model: config.stt_model.clone(),
            tts_model: config.tts_model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ChatbotError::Config(format!("Failed to build endpoint URL: {}", e)))
    }

    /// Send a request, retrying only 5xx and transport failures, up to the
    /// configured attempt count. The default of one attempt means provider
    /// errors surface immediately and unmodified.
    async fn send_with_retry<F>(&self, mut build_request: F) -> Result<reqwest::Response>
    where
        F: FnMut() -> Result<reqwest::RequestBuilder>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("Sarvam request attempt {}/{}", attempt, self.retry_attempts);

            match build_request()?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempt < self.retry_attempts {
                        let message = response.text().await.unwrap_or_default();
                        warn!(
                            "Server error (status {}), attempt {}/{}",
                            status, attempt, self.retry_attempts
                        );
                        last_error = Some(ChatbotError::Provider {
                            status: status.as_u16(),
                            message,
                        });
                    } else {
                        return check_status(response).await;
                    }
                }
                Err(error) => {
                    let transient = error.is_timeout() || error.is_connect();
                    if transient && attempt < self.retry_attempts {
                        warn!(
                            "Transport error: {}, attempt {}/{}",
                            error, attempt, self.retry_attempts
                        );
                        last_error = Some(ChatbotError::Network(error.to_string()));
                    } else {
                        return Err(ChatbotError::Network(error.to_string()));
                    }
                }
            }

            let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        Err(last_error
            .unwrap_or_else(|| ChatbotError::Network("Request failed after retries".to_string())))
    }
}

/// Pass a non-success response through as a provider error, body intact.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| status.to_string());
    Err(ChatbotError::Provider {
        status: status.as_u16(),
        message,
    })
}
