use std::fmt;

/// Classified failures from the two pipeline stages.
///
/// Every variant is caught at the `/analyze` handler and turned into the
/// `error` string of the response body; none of them surface as a
/// transport-level status code.
#[derive(Debug)]
pub enum AnalysisError {
    /// YouTube returned 404: the video is gone or comments are disabled.
    NotFound,
    /// Any other non-200 from YouTube, or a network failure reaching it.
    Upstream {
        status: Option<u16>,
        detail: String,
    },
    /// No usable reply could be obtained from the model.
    ModelInvocation(String),
    /// A reply was obtained but is not the JSON we asked for.
    /// `cleaned` keeps the fence-stripped text so model drift can be
    /// diagnosed from the response alone.
    ModelOutputParse { reason: String, cleaned: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::NotFound => {
                write!(f, "Video not found or comments disabled")
            }
            AnalysisError::Upstream {
                status: Some(status),
                detail,
            } => {
                write!(f, "YouTube API error ({}): {}", status, detail)
            }
            AnalysisError::Upstream {
                status: None,
                detail,
            } => {
                write!(f, "YouTube API error: {}", detail)
            }
            AnalysisError::ModelInvocation(cause) => {
                write!(f, "Gemini error: {}", cause)
            }
            AnalysisError::ModelOutputParse { reason, cleaned } => {
                write!(
                    f,
                    "Failed parsing model output: {}\nCleaned output:\n{}",
                    reason, cleaned
                )
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            AnalysisError::NotFound.to_string(),
            "Video not found or comments disabled"
        );
    }

    #[test]
    fn test_upstream_message_with_status() {
        let err = AnalysisError::Upstream {
            status: Some(403),
            detail: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "YouTube API error (403): quota exceeded");
    }

    #[test]
    fn test_parse_error_keeps_cleaned_text() {
        let err = AnalysisError::ModelOutputParse {
            reason: "expected value at line 1".to_string(),
            cleaned: "not json at all".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("not json at all"));
        assert!(msg.contains("Failed parsing model output"));
    }
}
