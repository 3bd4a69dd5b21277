use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

const EXTENDED_WORD_LIMIT: usize = 500;
const BRAND_HANDLE: &str = "@alyssaharperadvice";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationStyle {
    /// 30-60 second short-video voiceover.
    #[default]
    Short,
    /// Two to three minute read for long-form video or podcast.
    Extended,
}

impl NarrationStyle {
    pub fn script(self, resource: &Resource) -> String {
        match self {
            NarrationStyle::Short => short_script(resource),
            NarrationStyle::Extended => extended_script(resource),
        }
    }
}

fn short_script(resource: &Resource) -> String {
    let mut script = format!("{}. {} ", resource.hook, resource.description);
    script.push_str("Here's what you need to know: ");
    for point in resource.key_points.iter().take(3) {
        let _ = write!(script, "{}. ", point);
    }
    let _ = write!(
        script,
        "Want the full framework? Link in bio. DM me 'DAY{}' for the password. Let's level up together!",
        resource.day
    );
    script
}

fn extended_script(resource: &Resource) -> String {
    let mut script = format!(
        "Day {}: {}. {} {} \n\n",
        resource.day, resource.title, resource.hook, resource.description
    );
    let words: Vec<&str> = resource
        .full_content
        .split_whitespace()
        .take(EXTENDED_WORD_LIMIT)
        .collect();
    script.push_str(&words.join(" "));
    script.push_str(
        "\n\nFor the complete guide with examples and templates, check the link in the description. ",
    );
    let _ = write!(
        script,
        "And if you want even more resources, follow {} on TikTok.",
        BRAND_HANDLE
    );
    script
}

/// One synthesized narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFile {
    pub day: u32,
    pub title: String,
    pub filename: String,
    pub filepath: String,
    pub script: String,
}

/// Contents of `audio_files.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioManifest {
    pub generated_at: Option<DateTime<Utc>>,
    pub voice_id: String,
    pub voice_name: String,
    pub output_directory: String,
    pub files: Vec<AudioFile>,
}
