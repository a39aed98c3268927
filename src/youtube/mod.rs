use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AnalysisError;

const COMMENT_THREADS_URL: &str = "https://www.googleapis.com/youtube/v3/commentThreads";

/// First page only; the front end has no use for more.
const MAX_RESULTS: u32 = 100;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of plain-text comments for a video.
///
/// `YouTubeClient` is the production implementation; handlers hold the
/// trait object so tests can swap in a canned source.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Return the video's top-level comments in upstream order.
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<String>, AnalysisError>;
}

/// YouTube Data API v3 `commentThreads` client.
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, api_key }
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<String>, AnalysisError> {
        // No local validation of the id; a malformed one is rejected upstream.
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(COMMENT_THREADS_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("videoId", video_id),
                ("part", "snippet"),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::Upstream {
                status: None,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AnalysisError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let threads: CommentThreadsResponse =
            response.json().await.map_err(|e| AnalysisError::Upstream {
                status: Some(status.as_u16()),
                detail: format!("Failed to decode comment list: {}", e),
            })?;

        let comments = threads.into_comments();
        info!("Fetched {} comments for video {}", comments.len(), video_id);
        Ok(comments)
    }
}

/// `commentThreads?part=snippet` response, narrowed to the fields we read.
#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textOriginal")]
    text_original: String,
}

impl CommentThreadsResponse {
    /// Comment texts in the order the API listed them.
    fn into_comments(self) -> Vec<String> {
        self.items
            .into_iter()
            .map(|item| item.snippet.top_level_comment.snippet.text_original)
            .collect()
    }
}
