use thiserror::Error;

#[derive(Debug, Error)]
pub enum VeoError {
    #[error("No API key saved")]
    MissingCredential,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success response from the provider. The display starts with the
    /// HTTP status line ("429 Too Many Requests") so messages can be matched.
    #[error("{status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Video generation failed: {0}")]
    Generation(String),

    #[error("Video generation completed, but no download link was found.")]
    NoAssetLocation,

    /// Shows the reason phrase only; the numeric status stays in `status`.
    #[error(
        "Failed to fetch the generated video. Status: {}. Body: {body}",
        .status.canonical_reason().unwrap_or("Unknown")
    )]
    AssetFetch {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Operation still running after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for VeoError {
    fn from(err: reqwest::Error) -> Self {
        VeoError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for VeoError {
    fn from(err: serde_json::Error) -> Self {
        VeoError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for VeoError {
    fn from(err: std::io::Error) -> Self {
        VeoError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VeoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn api_error_leads_with_status_line() {
        let err = VeoError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "429 Too Many Requests: quota");
    }

    #[test]
    fn asset_fetch_shows_reason_phrase() {
        let err = VeoError::AssetFetch {
            status: StatusCode::NOT_FOUND,
            body: "abc".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch the generated video. Status: Not Found. Body: abc"
        );
    }

    #[test]
    fn missing_asset_mentions_download_link() {
        assert!(VeoError::NoAssetLocation
            .to_string()
            .contains("no download link was found"));
    }
}
