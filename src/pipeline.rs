use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ai::{generation_prompt, parse_resources, ContentGenerator};
use crate::config::{Config, ANTHROPIC_KEY_VAR, APIFY_KEY_VAR, ELEVENLABS_KEY_VAR};
use crate::dashboard::{merge_into_file, next_day_number, MergeOptions, MergeReport};
use crate::error::{AppError, Result};
use crate::models::{
    AudioFile, AudioManifest, GeneratedContent, Resource, TrendRecord, TrendingSnapshot,
};
use crate::services::{write_resource_pdf, SpeechSynthesizer, TrendScraper};

/// The four stages, each reading the file the previous one wrote.
pub struct Pipeline {
    config: Config,
    scraper: Option<TrendScraper>,
    generator: Option<ContentGenerator>,
    speech: Option<SpeechSynthesizer>,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let scraper = config
            .apify_api_key
            .clone()
            .map(|key| TrendScraper::new(key, config.scrape.results_per_page))
            .transpose()?;

        let generator = config
            .anthropic_api_key
            .clone()
            .map(ContentGenerator::new)
            .transpose()?;

        let speech = config
            .elevenlabs_api_key
            .clone()
            .map(|key| {
                SpeechSynthesizer::new(key, config.audio.voice_id.clone(), config.audio.model.clone())
            })
            .transpose()?;

        Ok(Self {
            config,
            scraper,
            generator,
            speech,
        })
    }

    /// Scrape every configured query and persist the top trends.
    pub async fn collect_trends(&self) -> Result<Vec<TrendRecord>> {
        skip_on_precondition("Trend collection", self.try_collect_trends().await)
    }

    async fn try_collect_trends(&self) -> Result<Vec<TrendRecord>> {
        let scraper = self
            .scraper
            .as_ref()
            .ok_or(AppError::MissingCredential(APIFY_KEY_VAR))?;
        let queries = &self.config.scrape.queries;

        let mut records = Vec::new();
        for (i, query) in queries.iter().enumerate() {
            tracing::info!("[{}/{}] Scraping '{}'", i + 1, queries.len(), query);
            match scraper.search(query).await {
                Ok(found) => {
                    tracing::info!("Found {} videos for '{}'", found.len(), query);
                    records.extend(found);
                }
                Err(e) => {
                    tracing::warn!("Failed to scrape '{}': {}", query, e);
                }
            }
        }

        let snapshot = TrendingSnapshot::rank(records, self.config.scrape.top_n);
        tracing::info!(
            "Keeping top {} of {} scraped videos",
            snapshot.top_videos.len(),
            snapshot.total_videos
        );
        write_json(&self.config.paths.trending, &snapshot)?;

        Ok(snapshot.top_videos)
    }

    /// Ask the model for new resources, parse them, render their PDFs and
    /// persist them.
    pub async fn generate_resources(&self) -> Result<Vec<Resource>> {
        skip_on_precondition("Content generation", self.try_generate_resources().await)
    }

    async fn try_generate_resources(&self) -> Result<Vec<Resource>> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(AppError::MissingCredential(ANTHROPIC_KEY_VAR))?;
        let snapshot: TrendingSnapshot = read_json(&self.config.paths.trending)?;
        let settings = &self.config.generation;

        let summaries: Vec<_> = snapshot
            .top_videos
            .iter()
            .take(settings.trend_samples)
            .map(TrendRecord::summary)
            .collect();
        let next_day = self.next_day();
        let last_day = next_day.saturating_add(settings.resources_per_run.saturating_sub(1));
        tracing::info!(
            "Generating Days {}-{} from {} trends with {}",
            next_day,
            last_day,
            summaries.len(),
            generator.model_version()
        );

        let prompt = generation_prompt(&summaries, next_day, settings.resources_per_run)?;
        let reply = match generator.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Generation request failed: {}", e);
                return Ok(Vec::new());
            }
        };

        let outcome = parse_resources(&reply, next_day);
        if outcome.dropped > 0 {
            tracing::warn!(
                "Dropped {} generated section(s) missing a title or content",
                outcome.dropped
            );
        }
        tracing::info!("Parsed {} resources", outcome.resources.len());

        for resource in &outcome.resources {
            match write_resource_pdf(resource, &self.config.paths.pdf_dir) {
                Ok(path) => tracing::info!("Created {}", path.display()),
                Err(e) => tracing::error!("Failed to render PDF for Day {}: {}", resource.day, e),
            }
        }

        let content = GeneratedContent {
            generated_at: Utc::now(),
            resources: outcome.resources,
        };
        write_json(&self.config.paths.content, &content)?;

        Ok(content.resources)
    }

    /// Synthesize one narration per generated resource.
    pub async fn synthesize_audio(&self) -> Result<Vec<AudioFile>> {
        skip_on_precondition("Audio generation", self.try_synthesize_audio().await)
    }

    async fn try_synthesize_audio(&self) -> Result<Vec<AudioFile>> {
        let speech = self
            .speech
            .as_ref()
            .ok_or(AppError::MissingCredential(ELEVENLABS_KEY_VAR))?;
        let content: GeneratedContent = read_json(&self.config.paths.content)?;
        let audio = &self.config.audio;

        let output_dir = &self.config.paths.audio_dir;
        std::fs::create_dir_all(output_dir)?;
        let output_dir = std::fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.clone());
        tracing::info!("Voice: {} ({}), output: {}", audio.voice_name, audio.voice_id, output_dir.display());

        let total = content.resources.len();
        let mut files = Vec::new();
        for (i, resource) in content.resources.iter().enumerate() {
            let filename = resource.audio_filename();
            let filepath = output_dir.join(&filename);
            let script = audio.style.script(resource);
            tracing::info!(
                "[{}/{}] Day {}: {} ({} chars)",
                i + 1,
                total,
                resource.day,
                filename,
                script.chars().count()
            );

            match speech.synthesize_to_file(&script, &filepath).await {
                Ok(bytes) => {
                    tracing::info!("Saved {} ({} bytes)", filepath.display(), bytes);
                    files.push(AudioFile {
                        day: resource.day,
                        title: resource.title.clone(),
                        filename,
                        filepath: filepath.to_string_lossy().to_string(),
                        script,
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to synthesize Day {}: {}", resource.day, e);
                }
            }
        }

        let manifest = AudioManifest {
            generated_at: Some(content.generated_at),
            voice_id: audio.voice_id.clone(),
            voice_name: audio.voice_name.clone(),
            output_directory: output_dir.to_string_lossy().to_string(),
            files,
        };
        write_json(&self.config.paths.audio_manifest, &manifest)?;

        Ok(manifest.files)
    }

    /// Merge the generated resources into the dashboard page. A missing card
    /// container is an error; everything else degrades to a warning.
    pub async fn update_dashboard(&self) -> Result<MergeReport> {
        skip_on_precondition("Dashboard update", self.try_update_dashboard())
    }

    fn try_update_dashboard(&self) -> Result<MergeReport> {
        let content: GeneratedContent = read_json(&self.config.paths.content)?;
        if content.resources.is_empty() {
            tracing::info!("No new resources to publish");
            return Ok(MergeReport::default());
        }
        tracing::info!("Adding {} resources to the dashboard", content.resources.len());

        let options = MergeOptions {
            duplicate_days: self.config.dashboard.duplicate_days,
            update_series_title: self.config.dashboard.update_series_title,
        };
        merge_into_file(&self.config.paths.dashboard, &content.resources, &options)
    }

    fn next_day(&self) -> u32 {
        let fallback = self.config.generation.fallback_next_day;
        match std::fs::read_to_string(&self.config.paths.dashboard) {
            Ok(html) => next_day_number(&html, fallback),
            Err(e) => {
                tracing::debug!("No dashboard to read day numbers from: {}", e);
                fallback
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn skip_on_precondition<T: Default>(stage: &str, result: Result<T>) -> Result<T> {
    match result {
        Err(e) if e.is_precondition() => {
            tracing::error!("{} skipped: {}", stage, e);
            Ok(T::default())
        }
        other => other,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(AppError::MissingInput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
