use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{EngagementCounts, TrendRecord};

const APIFY_API_URL: &str = "https://api.apify.com/v2";
const TIKTOK_ACTOR: &str = "clockworks/free-tiktok-scraper";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    search_queries: [&'a str; 1],
    results_per_page: u32,
    should_download_videos: bool,
    should_download_covers: bool,
    should_download_slideshow_images: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapedPost {
    text: Option<String>,
    author_meta: Option<AuthorMeta>,
    play_count: Option<u64>,
    digg_count: Option<u64>,
    share_count: Option<u64>,
    comment_count: Option<u64>,
    web_video_url: Option<String>,
    #[serde(default)]
    hashtags: Vec<Hashtag>,
    #[serde(default)]
    create_time: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorMeta {
    name: Option<String>,
    nick_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hashtag {
    name: Option<String>,
}

impl ScrapedPost {
    fn into_trend(self, query: &str) -> TrendRecord {
        let author = self.author_meta.unwrap_or_default();
        let username = author.name.unwrap_or_default();
        let display_name = author
            .nick_name
            .filter(|n| !n.is_empty())
            .or_else(|| Some(username.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());

        let created_time = match self.create_time {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        };

        TrendRecord::new(
            query,
            self.text.as_deref().unwrap_or_default(),
            display_name,
            username,
            EngagementCounts {
                views: self.play_count.unwrap_or(0),
                likes: self.digg_count.unwrap_or(0),
                shares: self.share_count.unwrap_or(0),
                comments: self.comment_count.unwrap_or(0),
            },
            self.web_video_url.unwrap_or_default(),
            self.hashtags
                .into_iter()
                .filter_map(|tag| tag.name)
                .filter(|name| !name.is_empty())
                .collect(),
            created_time,
        )
    }
}

/// Runs the TikTok search actor synchronously and returns its dataset items.
pub struct TrendScraper {
    client: Client,
    api_token: String,
    results_per_page: u32,
}

impl TrendScraper {
    pub fn new(api_token: String, results_per_page: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_token,
            results_per_page,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<TrendRecord>> {
        let request = ScrapeRequest {
            search_queries: [query],
            results_per_page: self.results_per_page,
            should_download_videos: false,
            should_download_covers: false,
            should_download_slideshow_images: false,
        };

        let response = self
            .client
            .post(format!(
                "{}/acts/{}/run-sync-get-dataset-items",
                APIFY_API_URL,
                TIKTOK_ACTOR.replace('/', "~")
            ))
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::ScraperApi(format!("{}: {}", status, error_text)));
        }

        let posts: Vec<ScrapedPost> = response.json().await?;

        Ok(posts.into_iter().map(|post| post.into_trend(query)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_disables_downloads() {
        let request = ScrapeRequest {
            search_queries: ["resume tips ATS beat"],
            results_per_page: 10,
            should_download_videos: false,
            should_download_covers: false,
            should_download_slideshow_images: false,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["searchQueries"][0], "resume tips ATS beat");
        assert_eq!(value["resultsPerPage"], 10);
        assert_eq!(value["shouldDownloadVideos"], false);
        assert_eq!(value["shouldDownloadSlideshowImages"], false);
    }

    #[test]
    fn test_post_normalization() {
        let post: ScrapedPost = serde_json::from_str(
            r#"{
                "text": "Say this in your next 1:1",
                "authorMeta": {"name": "careercoach", "nickName": "Career Coach"},
                "playCount": 1000,
                "diggCount": 50,
                "shareCount": 4,
                "commentCount": null,
                "webVideoUrl": "https://www.tiktok.com/@careercoach/video/1",
                "hashtags": [{"name": "career"}, {"name": ""}, {}],
                "createTime": 1718000000
            }"#,
        )
        .unwrap();

        let trend = post.into_trend("meeting control phrases");

        assert_eq!(trend.query, "meeting control phrases");
        assert_eq!(trend.author_name, "Career Coach");
        assert_eq!(trend.author_username, "careercoach");
        assert_eq!(trend.counts.comments, 0);
        assert_eq!(trend.hashtags, vec!["career"]);
        assert_eq!(trend.created_time, "1718000000");
        assert_eq!(trend.engagement_score(), 100.0 + 50.0 + 20.0);
    }

    #[test]
    fn test_empty_post_uses_fallbacks() {
        let trend = ScrapedPost::default().into_trend("q");
        assert_eq!(trend.author_name, "Unknown");
        assert_eq!(trend.author_username, "");
        assert_eq!(trend.text, "");
        assert_eq!(trend.engagement_score(), 0.0);
    }
}
