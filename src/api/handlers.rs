use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Query parameters for `/analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// The relay's single response envelope. Pipeline failures land in
/// `error`; the HTTP status stays 200 so the front end only ever checks
/// one field.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub comments: Vec<String>,
    pub sentiment: Vec<String>,
    pub keywords: Vec<Vec<String>>,
    pub error: Option<String>,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Caller contract violations, the only failures that surface as a
/// transport-level status.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// GET /analyze?videoId=...
/// Fetch the video's comments, run them through the model, and return
/// comments, sentiment labels, and keyword arrays.
pub async fn analyze(
    Query(params): Query<AnalyzeParams>,
    State(state): State<ApiState>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // A missing videoId is already a 400 from the Query extractor; an
    // empty one is the same contract violation spelled differently.
    if params.video_id.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "videoId must not be empty".to_string(),
        ));
    }

    // Step 1: fetch comments
    let comments = match state.comments.fetch_comments(&params.video_id).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!("Comment fetch failed for {}: {}", params.video_id, e);
            return Ok(Json(AnalyzeResponse {
                comments: Vec::new(),
                sentiment: Vec::new(),
                keywords: Vec::new(),
                error: Some(e.to_string()),
            }));
        }
    };

    // Step 2: analyze comments
    let analysis = match state.model.analyze(&comments).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Analysis failed for {}: {}", params.video_id, e);
            return Ok(Json(AnalyzeResponse {
                comments,
                sentiment: Vec::new(),
                keywords: Vec::new(),
                error: Some(e.to_string()),
            }));
        }
    };

    // Step 3: success
    info!(
        "Analyzed {} comments for video {}",
        comments.len(),
        params.video_id
    );
    Ok(Json(AnalyzeResponse {
        comments,
        sentiment: analysis.sentiments,
        keywords: analysis.keywords,
        error: None,
    }))
}

/// Response for `/debug`
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub youtube_api_key_set: bool,
    pub gemini_api_key_set: bool,
    pub model_in_use: String,
}

/// GET /debug
/// Confirm that credentials and model selection are configured.
pub async fn debug(State(state): State<ApiState>) -> Json<DebugResponse> {
    Json(DebugResponse {
        youtube_api_key_set: state.debug.youtube_api_key_set,
        gemini_api_key_set: state.debug.gemini_api_key_set,
        model_in_use: state.debug.model_in_use.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DebugInfo;
    use crate::error::AnalysisError;
    use crate::gemini::{Analysis, SentimentModel};
    use crate::youtube::CommentSource;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedComments(Result<Vec<String>, fn() -> AnalysisError>);

    #[async_trait]
    impl CommentSource for FixedComments {
        async fn fetch_comments(&self, _video_id: &str) -> Result<Vec<String>, AnalysisError> {
            match &self.0 {
                Ok(comments) => Ok(comments.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct FixedModel(Result<Analysis, fn() -> AnalysisError>);

    #[async_trait]
    impl SentimentModel for FixedModel {
        async fn analyze(&self, comments: &[String]) -> Result<Analysis, AnalysisError> {
            if comments.is_empty() {
                return Ok(Analysis {
                    sentiments: Vec::new(),
                    keywords: Vec::new(),
                });
            }
            match &self.0 {
                Ok(analysis) => Ok(analysis.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn state(comments: FixedComments, model: FixedModel) -> ApiState {
        ApiState {
            comments: Arc::new(comments),
            model: Arc::new(model),
            debug: DebugInfo {
                youtube_api_key_set: true,
                gemini_api_key_set: true,
                model_in_use: "gemini-2.5-flash".to_string(),
            },
        }
    }

    fn params(video_id: &str) -> Query<AnalyzeParams> {
        Query(AnalyzeParams {
            video_id: video_id.to_string(),
        })
    }

    #[tokio::test]
    async fn test_full_success() {
        let st = state(
            FixedComments(Ok(vec!["Great video!".to_string()])),
            FixedModel(Ok(Analysis {
                sentiments: vec!["positive".to_string()],
                keywords: vec![vec!["great".to_string(), "video".to_string()]],
            })),
        );

        let Json(body) = analyze(params("abc123"), State(st)).await.unwrap();
        assert_eq!(body.comments, vec!["Great video!"]);
        assert_eq!(body.sentiment, vec!["positive"]);
        assert_eq!(body.keywords, vec![vec!["great", "video"]]);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_video_not_found() {
        let st = state(
            FixedComments(Err(|| AnalysisError::NotFound)),
            FixedModel(Ok(Analysis {
                sentiments: Vec::new(),
                keywords: Vec::new(),
            })),
        );

        let Json(body) = analyze(params("gone"), State(st)).await.unwrap();
        assert!(body.comments.is_empty());
        assert!(body.sentiment.is_empty());
        assert!(body.keywords.is_empty());
        assert_eq!(
            body.error.as_deref(),
            Some("Video not found or comments disabled")
        );
    }

    #[tokio::test]
    async fn test_model_failure_keeps_comments() {
        let st = state(
            FixedComments(Ok(vec!["nice".to_string(), "bad".to_string()])),
            FixedModel(Err(|| {
                AnalysisError::ModelInvocation("quota exhausted".to_string())
            })),
        );

        let Json(body) = analyze(params("abc123"), State(st)).await.unwrap();
        assert_eq!(body.comments, vec!["nice", "bad"]);
        assert!(body.sentiment.is_empty());
        assert!(body.keywords.is_empty());
        assert_eq!(body.error.as_deref(), Some("Gemini error: quota exhausted"));
    }

    #[tokio::test]
    async fn test_zero_comments_is_success() {
        let st = state(
            FixedComments(Ok(Vec::new())),
            FixedModel(Err(|| {
                AnalysisError::ModelInvocation("must not be called".to_string())
            })),
        );

        let Json(body) = analyze(params("quiet"), State(st)).await.unwrap();
        assert!(body.comments.is_empty());
        assert!(body.sentiment.is_empty());
        assert!(body.keywords.is_empty());
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_blank_video_id_is_rejected() {
        let st = state(
            FixedComments(Ok(Vec::new())),
            FixedModel(Ok(Analysis {
                sentiments: Vec::new(),
                keywords: Vec::new(),
            })),
        );

        let result = analyze(params("   "), State(st)).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_success_serializes_error_as_null() {
        let body = AnalyzeResponse {
            comments: vec!["Great video!".to_string()],
            sentiment: vec!["positive".to_string()],
            keywords: vec![vec!["great".to_string(), "video".to_string()]],
            error: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"comments":["Great video!"],"sentiment":["positive"],"keywords":[["great","video"]],"error":null}"#
        );
    }
}
