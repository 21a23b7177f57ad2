use serde::Serialize;

/// Capability set of a Veo model. Every option in a request is checked
/// against these lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub supports_image: bool,
    pub supports_mute_audio: bool,
    pub aspect_ratios: &'static [&'static str],
    pub durations: &'static [u32],
    pub video_counts: &'static [u32],
}

pub const VEO_MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "veo-2.0-generate-001",
        name: "VEO 2",
        supports_image: true,
        supports_mute_audio: false,
        aspect_ratios: &["16:9", "9:16"],
        durations: &[5, 8],
        video_counts: &[1, 2],
    },
    ModelSpec {
        id: "veo-3.0-generate-preview",
        name: "VEO 3 (Preview)",
        supports_image: true,
        supports_mute_audio: true,
        aspect_ratios: &["16:9"],
        durations: &[8],
        video_counts: &[1],
    },
    ModelSpec {
        id: "veo-3.0-fast-generate-preview",
        name: "VEO 3 (Fast Preview)",
        supports_image: true,
        supports_mute_audio: true,
        aspect_ratios: &["16:9"],
        durations: &[8],
        video_counts: &[1],
    },
];

impl ModelSpec {
    pub fn find(id: &str) -> Option<&'static ModelSpec> {
        VEO_MODELS.iter().find(|model| model.id == id)
    }

    pub fn default_model() -> &'static ModelSpec {
        &VEO_MODELS[0]
    }

    pub fn default_aspect_ratio(&self) -> &'static str {
        self.aspect_ratios[0]
    }

    pub fn default_duration(&self) -> u32 {
        self.durations[0]
    }

    /// The catalog's own copy of `ratio`, when the model offers it.
    pub fn aspect_ratio(&self, ratio: &str) -> Option<&'static str> {
        self.aspect_ratios.iter().copied().find(|allowed| *allowed == ratio)
    }

    pub fn allows_duration(&self, seconds: u32) -> bool {
        self.durations.contains(&seconds)
    }

    pub fn allows_video_count(&self, count: u32) -> bool {
        self.video_counts.contains(&count)
    }
}
