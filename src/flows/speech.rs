//! Speech synthesis flow — text to audio via an OpenAI-compatible
//! `/audio/speech` endpoint.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::error::GenerationError;

/// The TTS endpoint rejects inputs longer than this.
const TTS_MAX_INPUT_CHARS: usize = 4096;

/// Synthesized audio, encoded for direct playback in a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// `data:` URI holding base64-encoded MP3 audio.
    pub media: String,
}

/// Synthesizes speech over HTTP.
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
}

/// TTS request body.
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

impl SpeechSynthesizer {
    pub fn new(config: SpeechConfig, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::RequestFailed {
                provider: "tts".to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Synthesize `text` into audio. One attempt; failure propagates.
    pub async fn synthesize(&self, text: &str) -> Result<SpeechAudio, GenerationError> {
        if text.chars().count() > TTS_MAX_INPUT_CHARS {
            return Err(GenerationError::RequestFailed {
                provider: "tts".to_string(),
                reason: format!(
                    "text too long for synthesis: {} characters exceeds {} limit",
                    text.chars().count(),
                    TTS_MAX_INPUT_CHARS
                ),
            });
        }

        let request = TtsRequest {
            model: &self.config.model,
            input: text,
            voice: &self.config.voice,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed {
                provider: "tts".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed {
                provider: "tts".to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::InvalidResponse {
                reason: format!("failed to read audio body: {e}"),
            })?;

        if bytes.is_empty() {
            return Err(GenerationError::InvalidResponse {
                reason: "TTS endpoint returned an empty audio body".to_string(),
            });
        }

        debug!(audio_bytes = bytes.len(), "Speech synthesized");

        Ok(SpeechAudio {
            media: audio_data_uri(&bytes),
        })
    }
}

/// Encode audio bytes as a browser-playable `data:` URI.
fn audio_data_uri(bytes: &[u8]) -> String {
    format!("data:audio/mp3;base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_has_mime_prefix() {
        let uri = audio_data_uri(&[1, 2, 3]);
        assert!(uri.starts_with("data:audio/mp3;base64,"));
    }

    #[test]
    fn data_uri_round_trips_payload() {
        let payload = vec![0u8, 255, 128, 7];
        let uri = audio_data_uri(&payload);
        let encoded = uri.strip_prefix("data:audio/mp3;base64,").unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), payload);
    }

    #[tokio::test]
    async fn synthesize_rejects_over_long_text() {
        let config = SpeechConfig {
            api_key: secrecy::SecretString::from("test-key"),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
        };
        let synth = SpeechSynthesizer::new(config, Duration::from_secs(1)).unwrap();
        let err = synth.synthesize(&"x".repeat(5000)).await.unwrap_err();
        assert!(matches!(err, GenerationError::RequestFailed { .. }));
    }
}
