use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PASSWORD: &str = "ACCESS";

/// One generated career resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub day: u32,
    pub category: String,
    pub title: String,
    pub hook: String,
    pub description: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub password: String,
    pub full_content: String,
}

impl Resource {
    pub fn pdf_filename(&self) -> String {
        pdf_filename(self.day, &self.title)
    }

    pub fn audio_filename(&self) -> String {
        audio_filename(&self.title)
    }

    /// Key used by the dashboard's `passwords` and `pdfFiles` tables.
    pub fn day_key(&self) -> String {
        format!("day{}", self.day)
    }
}

/// Contents of `new_content.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub generated_at: DateTime<Utc>,
    pub resources: Vec<Resource>,
}

/// PDF file name for a resource. The dashboard's unlock button looks the
/// file up by this exact name, so the renderer and the `pdfFiles` table
/// must both go through here.
pub fn pdf_filename(day: u32, title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("Day_{}_{}.pdf", day, slug)
}

pub fn audio_filename(title: &str) -> String {
    let slug: String = title
        .chars()
        .filter(|c| !matches!(c, ':' | '?'))
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{}.mp3", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename() {
        assert_eq!(pdf_filename(7, "Salary Math"), "Day_7_Salary_Math.pdf");
        assert_eq!(
            pdf_filename(12, "Ask/Tell: Raise"),
            "Day_12_Ask_Tell:_Raise.pdf"
        );
    }

    #[test]
    fn test_audio_filename_strips_colon_and_question_mark() {
        assert_eq!(
            audio_filename("Why Ask? Raise: Now/Later"),
            "Why_Ask_Raise_Now_Later.mp3"
        );
    }

    #[test]
    fn test_missing_key_points_deserialize_empty() {
        let resource: Resource = serde_json::from_str(
            r#"{"day": 3, "category": "Career", "title": "T", "hook": "", "description": "",
                "password": "ACCESS", "full_content": "body"}"#,
        )
        .unwrap();
        assert!(resource.key_points.is_empty());
        assert_eq!(resource.day_key(), "day3");
    }
}
