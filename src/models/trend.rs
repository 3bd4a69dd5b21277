use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest post text kept from the scraper.
const MAX_TEXT_CHARS: usize = 2000;

/// Post text length handed to the generation prompt.
const SUMMARY_TEXT_CHARS: usize = 500;
const SUMMARY_HASHTAGS: usize = 5;

/// Weighted engagement: shares and comments count for more than likes,
/// views for much less.
pub fn engagement_score(views: u64, likes: u64, shares: u64, comments: u64) -> f64 {
    views as f64 * 0.1 + likes as f64 + shares as f64 * 5.0 + comments as f64 * 3.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// One scraped post. The engagement score is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub query: String,
    pub text: String,
    pub author_name: String,
    pub author_username: String,
    #[serde(flatten)]
    pub counts: EngagementCounts,
    pub url: String,
    pub hashtags: Vec<String>,
    pub created_time: String,
    #[serde(rename = "engagement_score")]
    engagement_score: f64,
}

impl TrendRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query: &str,
        text: &str,
        author_name: String,
        author_username: String,
        counts: EngagementCounts,
        url: String,
        hashtags: Vec<String>,
        created_time: String,
    ) -> Self {
        let engagement_score =
            engagement_score(counts.views, counts.likes, counts.shares, counts.comments);
        Self {
            query: query.to_string(),
            text: truncate_chars(text, MAX_TEXT_CHARS),
            author_name,
            author_username,
            counts,
            url,
            hashtags,
            created_time,
            engagement_score,
        }
    }

    pub fn engagement_score(&self) -> f64 {
        self.engagement_score
    }

    pub fn summary(&self) -> TrendSummary {
        TrendSummary {
            text: truncate_chars(&self.text, SUMMARY_TEXT_CHARS),
            engagement: self.engagement_score,
            hashtags: self.hashtags.iter().take(SUMMARY_HASHTAGS).cloned().collect(),
        }
    }
}

/// The slice of a trend the generation prompt sees.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub text: String,
    pub engagement: f64,
    pub hashtags: Vec<String>,
}

/// Contents of `trending_content.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSnapshot {
    pub scraped_at: DateTime<Utc>,
    pub total_videos: usize,
    pub top_videos: Vec<TrendRecord>,
}

impl TrendingSnapshot {
    /// Rank by engagement (highest first) and keep the top `top_n`.
    pub fn rank(mut records: Vec<TrendRecord>, top_n: usize) -> Self {
        let total_videos = records.len();
        records.sort_by(|a, b| b.engagement_score.total_cmp(&a.engagement_score));
        records.truncate(top_n);

        Self {
            scraped_at: Utc::now(),
            total_videos,
            top_videos: records,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, views: u64, likes: u64, shares: u64, comments: u64) -> TrendRecord {
        TrendRecord::new(
            "salary negotiation tips 2024",
            text,
            "Alyssa".to_string(),
            "alyssa".to_string(),
            EngagementCounts {
                views,
                likes,
                shares,
                comments,
            },
            String::new(),
            vec!["career".to_string()],
            "1718000000".to_string(),
        )
    }

    #[test]
    fn test_engagement_weights() {
        assert_eq!(engagement_score(1000, 0, 0, 0), 100.0);
        assert_eq!(engagement_score(0, 10, 2, 3), 10.0 + 10.0 + 9.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let records = vec![
            record("low", 10, 0, 0, 0),
            record("high", 0, 0, 100, 0),
            record("mid", 0, 50, 0, 0),
        ];

        let snapshot = TrendingSnapshot::rank(records, 2);

        assert_eq!(snapshot.total_videos, 3);
        let texts: Vec<_> = snapshot.top_videos.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid"]);
    }

    #[test]
    fn test_text_is_bounded_on_char_boundaries() {
        let long = "é".repeat(MAX_TEXT_CHARS + 10);
        let trend = record(&long, 0, 0, 0, 0);
        assert_eq!(trend.text.chars().count(), MAX_TEXT_CHARS);

        let summary = trend.summary();
        assert_eq!(summary.text.chars().count(), SUMMARY_TEXT_CHARS);
    }

    #[test]
    fn test_serialized_keys_match_file_format() {
        let trend = record("hi", 1, 2, 3, 4);
        let value = serde_json::to_value(&trend).unwrap();

        assert_eq!(value["authorUsername"], "alyssa");
        assert_eq!(value["views"], 1);
        assert_eq!(value["comments"], 4);
        assert_eq!(value["createdTime"], "1718000000");
        assert!(value.get("engagement_score").is_some());

        let back: TrendRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.engagement_score(), trend.engagement_score());
    }
}
