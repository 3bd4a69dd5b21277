use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dashboard::DuplicateDayPolicy;
use crate::error::{AppError, Result};
use crate::models::NarrationStyle;

pub const APIFY_KEY_VAR: &str = "APIFY_API_KEY";
pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const ELEVENLABS_KEY_VAR: &str = "ELEVENLABS_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub apify_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_trending_path")]
    pub trending: PathBuf,
    #[serde(default = "default_content_path")]
    pub content: PathBuf,
    #[serde(default = "default_audio_manifest_path")]
    pub audio_manifest: PathBuf,
    #[serde(default = "default_dashboard_path")]
    pub dashboard: PathBuf,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_resources_per_run")]
    pub resources_per_run: u32,
    #[serde(default = "default_trend_samples")]
    pub trend_samples: usize,
    #[serde(default = "default_fallback_next_day")]
    pub fallback_next_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
    #[serde(default = "default_speech_model")]
    pub model: String,
    #[serde(default)]
    pub style: NarrationStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub duplicate_days: DuplicateDayPolicy,
    #[serde(default)]
    pub update_series_title: bool,
}

fn default_trending_path() -> PathBuf {
    PathBuf::from("trending_content.json")
}

fn default_content_path() -> PathBuf {
    PathBuf::from("new_content.json")
}

fn default_audio_manifest_path() -> PathBuf {
    PathBuf::from("audio_files.json")
}

fn default_dashboard_path() -> PathBuf {
    PathBuf::from("index.html")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio_files")
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_queries() -> Vec<String> {
    [
        "salary negotiation tips 2024",
        "career advice professional growth",
        "LinkedIn message templates",
        "interview questions answers",
        "resume tips ATS beat",
        "meeting control phrases",
        "email subject lines professional",
        "promotion strategy workplace",
        "networking tips career",
        "professional development hacks",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

fn default_results_per_page() -> u32 {
    10
}

fn default_top_n() -> usize {
    20
}

fn default_resources_per_run() -> u32 {
    3
}

fn default_trend_samples() -> usize {
    15
}

fn default_fallback_next_day() -> u32 {
    11
}

fn default_voice_id() -> String {
    "Z3R5wn05IrDiVCyEkUrK".to_string()
}

fn default_voice_name() -> String {
    "Arabella".to_string()
}

fn default_speech_model() -> String {
    "eleven_multilingual_v2".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            trending: default_trending_path(),
            content: default_content_path(),
            audio_manifest: default_audio_manifest_path(),
            dashboard: default_dashboard_path(),
            audio_dir: default_audio_dir(),
            pdf_dir: default_pdf_dir(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            results_per_page: default_results_per_page(),
            top_n: default_top_n(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            resources_per_run: default_resources_per_run(),
            trend_samples: default_trend_samples(),
            fallback_next_day: default_fallback_next_day(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            voice_id: default_voice_id(),
            voice_name: default_voice_name(),
            model: default_speech_model(),
            style: NarrationStyle::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("content-pipeline")
            .join("config.toml")
    }

    /// Environment keys win over the config file. Empty values are ignored.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(APIFY_KEY_VAR) {
            self.apify_api_key = Some(key);
        }
        if let Some(key) = get(ANTHROPIC_KEY_VAR) {
            self.anthropic_api_key = Some(key);
        }
        if let Some(key) = get(ELEVENLABS_KEY_VAR) {
            self.elevenlabs_api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            anthropic_api_key = "sk-test"

            [scrape]
            top_n = 5

            [dashboard]
            duplicate_days = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.scrape.top_n, 5);
        assert_eq!(config.scrape.results_per_page, 10);
        assert_eq!(config.scrape.queries.len(), 10);
        assert_eq!(config.generation.fallback_next_day, 11);
        assert_eq!(config.paths.dashboard, PathBuf::from("index.html"));
        assert_eq!(config.dashboard.duplicate_days, DuplicateDayPolicy::Skip);
        assert_eq!(config.audio.style, NarrationStyle::Short);
    }

    #[test]
    fn test_env_overrides_file_keys() {
        let mut config = Config {
            apify_api_key: Some("from-file".to_string()),
            ..Config::default()
        };

        config.apply_env(|name| match name {
            APIFY_KEY_VAR => Some("from-env".to_string()),
            ELEVENLABS_KEY_VAR => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.apify_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.anthropic_api_key, None);
        assert_eq!(config.elevenlabs_api_key, None);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.audio.voice_id, "Z3R5wn05IrDiVCyEkUrK");
        assert_eq!(parsed.generation.resources_per_run, 3);
    }
}
