use crate::models::request::GenerationForm;
use serde::Serialize;
use std::path::PathBuf;

pub const MAX_BATCH_ITEMS: usize = 10;
const FILENAME_STEM_CHARS: usize = 50;

/// Raw batch input: one prompt per line, images paired by position.
#[derive(Debug, Clone, Default)]
pub struct BatchForm {
    pub prompts: String,
    pub images: Vec<PathBuf>,
    pub model_id: Option<String>,
    pub aspect_ratio: Option<String>,
    pub duration: Option<u32>,
    pub mute_audio: bool,
}

impl BatchForm {
    pub fn new(prompts: impl Into<String>) -> Self {
        Self {
            prompts: prompts.into(),
            ..Default::default()
        }
    }

    pub fn with_images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    /// Items in input order, at most [`MAX_BATCH_ITEMS`].
    pub fn items(&self) -> Vec<BatchItem> {
        parse_prompts(&self.prompts)
            .into_iter()
            .enumerate()
            .map(|(index, prompt)| BatchItem {
                index,
                prompt,
                image: self.images.iter().take(MAX_BATCH_ITEMS).nth(index).cloned(),
                status: ItemStatus::Pending,
            })
            .collect()
    }

    /// Form for one item. Batch runs always ask for a single video.
    pub fn form_for(&self, item: &BatchItem) -> GenerationForm {
        GenerationForm {
            prompt: item.prompt.clone(),
            model_id: self.model_id.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            video_count: Some(1),
            duration: self.duration,
            mute_audio: self.mute_audio,
            image: item.image.clone(),
        }
    }
}

/// Non-blank lines, trimmed, capped at [`MAX_BATCH_ITEMS`].
pub fn parse_prompts(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_BATCH_ITEMS)
        .map(String::from)
        .collect()
}

/// First 50 characters, anything outside `[A-Za-z0-9]` becomes `_`,
/// lower-cased.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .take(FILENAME_STEM_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `<position>_<sanitized prompt>.mp4`, position is 1-based.
pub fn batch_filename(index: usize, prompt: &str) -> String {
    format!("{}_{}.mp4", index + 1, sanitize_filename(prompt))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Succeeded { file: PathBuf },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub prompt: String,
    pub image: Option<PathBuf>,
    pub status: ItemStatus,
}

impl BatchItem {
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn filename(&self) -> String {
        batch_filename(self.index, &self.prompt)
    }
}

/// Outcome of a finished batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub items: Vec<BatchItem>,
    pub last_error: Option<String>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Failed { .. }))
            .count()
    }
}
