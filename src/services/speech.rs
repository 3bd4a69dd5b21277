use std::path::Path;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

pub struct SpeechSynthesizer {
    client: Client,
    api_key: String,
    voice_id: String,
    model: String,
}

impl SpeechSynthesizer {
    pub fn new(api_key: String, voice_id: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key,
            voice_id,
            model,
        })
    }

    /// Synthesize `text` and write the MP3 payload to `path`.
    pub async fn synthesize_to_file(&self, text: &str, path: &Path) -> Result<u64> {
        let request = SpeechRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(format!(
                "{}/text-to-speech/{}",
                ELEVENLABS_API_URL,
                urlencoding::encode(&self.voice_id)
            ))
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::SpeechApi(format!("{}: {}", status, error_text)));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(AppError::SpeechApi("empty audio payload".to_string()));
        }

        tokio::fs::write(path, &audio).await?;
        Ok(audio.len() as u64)
    }
}
