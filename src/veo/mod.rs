pub mod gemini_client;
pub mod orchestrator;

use crate::{
    error::Result,
    models::{GenerationRequest, Operation},
};
use async_trait::async_trait;

pub use gemini_client::GeminiClient;
pub use orchestrator::{Phase, VideoGenerator};

/// The generative video service: submit a job, poll it, fetch the result.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn start_generation(&self, api_key: &str, request: &GenerationRequest)
        -> Result<Operation>;

    async fn poll_operation(&self, api_key: &str, operation: &Operation) -> Result<Operation>;

    /// Downloads the asset behind `uri`, authenticating with `api_key`.
    async fn fetch_video(&self, api_key: &str, uri: &str) -> Result<Vec<u8>>;
}
