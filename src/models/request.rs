use crate::{
    error::{Result, VeoError},
    models::catalog::ModelSpec,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw form input for a single generation, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationForm {
    pub prompt: String,
    pub model_id: Option<String>,
    pub aspect_ratio: Option<String>,
    pub video_count: Option<u32>,
    pub duration: Option<u32>,
    #[serde(default)]
    pub mute_audio: bool,
    pub image: Option<PathBuf>,
}

impl GenerationForm {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    pub fn with_video_count(mut self, count: u32) -> Self {
        self.video_count = Some(count);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    pub fn model(&self) -> Result<&'static ModelSpec> {
        match self.model_id.as_deref() {
            None => Ok(ModelSpec::default_model()),
            Some(id) => ModelSpec::find(id)
                .ok_or_else(|| VeoError::InvalidRequest(format!("Unknown model: {}", id))),
        }
    }
}

/// Base64 image data ready to be embedded in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes_base64: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            bytes_base64: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for(path)?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(&bytes, mime_type))
    }
}

fn mime_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        _ => Err(VeoError::InvalidRequest(format!(
            "Unsupported image type (PNG or JPEG expected): {}",
            path.display()
        ))),
    }
}

/// Options that survived validation against the model's capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub aspect_ratio: &'static str,
    pub video_count: u32,
    pub duration: u32,
    pub mute_audio: bool,
}

/// A validated request. Only constructed through [`GenerationRequest::build`].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    model: &'static ModelSpec,
    options: GenerationOptions,
    image: Option<ImagePayload>,
}

impl GenerationRequest {
    pub fn build(form: &GenerationForm, image: Option<ImagePayload>) -> Result<Self> {
        let prompt = form.prompt.trim();
        if prompt.is_empty() {
            return Err(VeoError::InvalidRequest("Prompt must not be empty".into()));
        }

        let model = form.model()?;

        let aspect_ratio = match form.aspect_ratio.as_deref() {
            None => model.default_aspect_ratio(),
            Some(ratio) => model.aspect_ratio(ratio).ok_or_else(|| {
                VeoError::InvalidRequest(format!(
                    "Aspect ratio {} is not available for {} (allowed: {})",
                    ratio,
                    model.name,
                    model.aspect_ratios.join(", ")
                ))
            })?,
        };

        let video_count = form.video_count.unwrap_or(1);
        if !model.allows_video_count(video_count) {
            return Err(VeoError::InvalidRequest(format!(
                "{} cannot generate {} videos at once",
                model.name, video_count
            )));
        }

        let duration = form.duration.unwrap_or_else(|| model.default_duration());
        if !model.allows_duration(duration) {
            return Err(VeoError::InvalidRequest(format!(
                "Duration {}s is not available for {}",
                duration, model.name
            )));
        }

        if form.mute_audio && !model.supports_mute_audio {
            return Err(VeoError::InvalidRequest(format!(
                "{} does not support muting audio",
                model.name
            )));
        }

        let image = match image {
            Some(_) if !model.supports_image => {
                log::warn!("{} ignores image input, sending prompt only", model.id);
                None
            }
            other => other,
        };

        Ok(Self {
            prompt: prompt.to_string(),
            model,
            options: GenerationOptions {
                aspect_ratio,
                video_count,
                duration,
                mute_audio: form.mute_audio,
            },
            image,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &'static ModelSpec {
        self.model
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Body of the `predictLongRunning` call. Duration and mute-audio are
    /// validated but not sent.
    pub fn to_payload(&self) -> PredictLongRunningRequest {
        PredictLongRunningRequest {
            instances: vec![Instance {
                prompt: self.prompt.clone(),
                image: self.image.as_ref().map(|image| InlineImage {
                    bytes_base64_encoded: image.bytes_base64.clone(),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: Parameters {
                sample_count: self.options.video_count,
                aspect_ratio: Some(self.options.aspect_ratio.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictLongRunningRequest {
    pub instances: Vec<Instance>,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_come_from_the_model() {
        let request = GenerationRequest::build(&GenerationForm::new("  a cat  "), None).unwrap();
        assert_eq!(request.prompt(), "a cat");
        assert_eq!(request.model().id, "veo-2.0-generate-001");
        assert_eq!(
            request.options(),
            &GenerationOptions {
                aspect_ratio: "16:9",
                video_count: 1,
                duration: 5,
                mute_audio: false,
            }
        );
    }

    #[test]
    fn rejects_options_outside_capabilities() {
        let veo3 = GenerationForm::new("a cat").with_model("veo-3.0-generate-preview");

        let err = GenerationRequest::build(&veo3.clone().with_aspect_ratio("9:16"), None);
        assert!(matches!(err, Err(VeoError::InvalidRequest(_))));

        let err = GenerationRequest::build(&veo3.clone().with_video_count(2), None);
        assert!(matches!(err, Err(VeoError::InvalidRequest(_))));

        let err = GenerationRequest::build(&veo3.with_duration(5), None);
        assert!(matches!(err, Err(VeoError::InvalidRequest(_))));
    }

    #[test]
    fn rejects_blank_prompt_and_unknown_model() {
        assert!(GenerationRequest::build(&GenerationForm::new(" \n "), None).is_err());
        let unknown = GenerationForm::new("x").with_model("sora");
        assert!(matches!(
            GenerationRequest::build(&unknown, None),
            Err(VeoError::InvalidRequest(msg)) if msg.contains("sora")
        ));
    }

    #[test]
    fn mute_audio_requires_support() {
        let mut form = GenerationForm::new("x");
        form.mute_audio = true;
        assert!(GenerationRequest::build(&form, None).is_err());

        let form = GenerationForm {
            model_id: Some("veo-3.0-fast-generate-preview".into()),
            ..form
        };
        assert!(GenerationRequest::build(&form, None).unwrap().options().mute_audio);
    }

    #[test]
    fn payload_matches_wire_format() {
        let form = GenerationForm::new("sunset")
            .with_aspect_ratio("9:16")
            .with_video_count(2);
        let image = ImagePayload::from_bytes(b"png", "image/png");
        let payload = GenerationRequest::build(&form, Some(image)).unwrap().to_payload();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "instances": [{
                    "prompt": "sunset",
                    "image": { "bytesBase64Encoded": "cG5n", "mimeType": "image/png" }
                }],
                "parameters": { "sampleCount": 2, "aspectRatio": "9:16" }
            })
        );
    }

    #[test]
    fn image_mime_type_follows_extension() {
        assert_eq!(mime_type_for(Path::new("a/b.PNG")).unwrap(), "image/png");
        assert_eq!(mime_type_for(Path::new("shot.jpeg")).unwrap(), "image/jpeg");
        assert!(mime_type_for(Path::new("clip.gif")).is_err());
    }

    #[tokio::test]
    async fn image_payload_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let payload = ImagePayload::from_path(&path).await.unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.bytes_base64, "/9j/");
    }
}
