pub mod batch;
pub mod config;
pub mod error;
pub mod logger;
pub mod messages;
pub mod models;
pub mod storage;
pub mod studio;
pub mod translator;
pub mod veo;

#[cfg(test)]
mod testing;

pub use batch::{BatchEvent, BatchSequencer};
pub use config::{BatchConfig, Config, PollPolicy, VeoConfig};
pub use error::{Result, VeoError};
pub use messages::Locale;
pub use models::{
    BatchForm, BatchItem, BatchReport, GenerationForm, GenerationRequest, ImagePayload,
    ItemStatus, ModelSpec, Operation, VEO_MODELS,
};
pub use storage::{
    CredentialStore, DirectoryDownloader, DownloadSink, FileCredentialStore,
    MemoryCredentialStore,
};
pub use studio::{GenerationState, Studio, Submission};
pub use veo::{GeminiClient, Phase, VideoGenerator, VideoProvider};
