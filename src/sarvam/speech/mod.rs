
use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Language, SarvamClient};
use crate::{ChatbotError, Result};

/// Bulbul rejects inputs beyond this many characters; longer answers are
/// truncated before the request.
pub const TTS_MAX_CHARS: usize = 2500;

/// Transcription of a spoken question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub transcript: String,
    pub language_code: String,
}

#[derive(Debug, Deserialize)]
struct SpeechToTextResponse {
    transcript: Option<String>,
    language_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    target_language_code: &'static str,
    speaker: &'static str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextToSpeechResponse {
    audios: Vec<String>,
}

impl SarvamClient {
    /// Transcribe WAV audio to text in the given language.
    #[inline]
    pub async fn transcribe(&self, audio: Vec<u8>, language: Language) -> Result<Transcription> {
        debug!(
            "Transcribing {} bytes of audio ({})",
            audio.len(),
            language.code()
        );

        let url = self.endpoint("speech-to-text")?;
        let response = self
            .send_with_retry(|| {
                let part = Part::bytes(audio.clone())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| ChatbotError::Audio(format!("Invalid audio part: {}", e)))?;
                let form = Form::new()
                    .part("file", part)
                    .text("model", self.stt_model.clone())
                    .text("language_code", language.code());
                Ok(self.http.post(url.clone()).multipart(form))
            })
            .await?;

        let parsed: SpeechToTextResponse = response
            .json()
            .await
            .map_err(|e| ChatbotError::Other(anyhow!("Malformed speech-to-text response: {}", e)))?;

        Ok(Transcription {
            transcript: parsed.transcript.unwrap_or_default(),
            language_code: parsed
                .language_code
                .unwrap_or_else(|| language.code().to_string()),
        })
    }

    /// Synthesize the answer to WAV bytes with the language's default voice.
    #[inline]
    pub async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let text = truncate_for_tts(text);

        debug!(
            "Synthesizing {} chars of text ({}, voice {})",
            text.chars().count(),
            language.code(),
            language.tts_voice()
        );

        let request = TextToSpeechRequest {
            text: &text,
            target_language_code: language.code(),
            speaker: language.tts_voice(),
            model: &self.tts_model,
        };

        let url = self.endpoint("text-to-speech")?;
        let response = self
            .send_with_retry(|| Ok(self.http.post(url.clone()).json(&request)))
            .await?;

        let parsed: TextToSpeechResponse = response
            .json()
            .await
            .map_err(|e| ChatbotError::Other(anyhow!("Malformed text-to-speech response: {}", e)))?;

        let encoded = parsed
            .audios
            .into_iter()
            .next()
            .ok_or_else(|| ChatbotError::Audio("Response contained no audio".to_string()))?;

        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ChatbotError::Audio(format!("Failed to decode audio payload: {}", e)))
    }
}

fn truncate_for_tts(text: &str) -> String {
    if text.chars().count() <= TTS_MAX_CHARS {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(TTS_MAX_CHARS - 10).collect();
    truncated.push_str("...");
    truncated
}
