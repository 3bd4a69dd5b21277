use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Claude API error: {0}")]
    ClaudeApi(String),

    #[error("ElevenLabs API error: {0}")]
    SpeechApi(String),

    #[error("Apify API error: {0}")]
    ScraperApi(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0} not set")]
    MissingCredential(&'static str),

    #[error("{} not found", .0.display())]
    MissingInput(PathBuf),

    #[error("Dashboard structure error: {0}")]
    Dashboard(String),

    #[error("Day {0} already exists in the dashboard")]
    DuplicateDay(u32),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<printpdf::Error> for AppError {
    fn from(err: printpdf::Error) -> Self {
        AppError::Pdf(err.to_string())
    }
}

impl AppError {
    /// Stage preconditions that abort a stage with an empty result rather
    /// than failing the process.
    pub fn is_precondition(&self) -> bool {
        matches!(self, AppError::MissingCredential(_) | AppError::MissingInput(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
