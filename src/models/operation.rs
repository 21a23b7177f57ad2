use serde::{Deserialize, Serialize};

/// Long-running operation as returned by `predictLongRunning` and the
/// operations endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rai_media_filtered_reasons: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn completed_with_uri(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            response: Some(OperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: vec![GeneratedSample {
                        video: Some(VideoRef {
                            uri: Some(uri.into()),
                        }),
                    }],
                    rai_media_filtered_reasons: None,
                }),
            }),
            ..Default::default()
        }
    }

    pub fn failed(name: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: Some(OperationError {
                code,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    /// Location of the first generated video, if any.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
    }

    /// Reasons given when the safety filter removed every sample.
    pub fn filtered_reasons(&self) -> Option<&[String]> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .rai_media_filtered_reasons
            .as_deref()
    }

    /// Provider-side progress state, when reported.
    pub fn state(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("state")?.as_str()
    }
}
