use crate::{
    config::PollPolicy,
    error::{Result, VeoError},
    logger,
    models::GenerationRequest,
    veo::VideoProvider,
};
use std::sync::Arc;

/// Progress reported while a generation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Submitting,
    /// Reported after every status check that found the job still running.
    Polling { attempt: u32, state: Option<String> },
    Downloading,
}

/// Submits a request, polls the operation to completion and fetches the video.
#[derive(Clone)]
pub struct VideoGenerator {
    provider: Arc<dyn VideoProvider>,
    poll: PollPolicy,
}

impl VideoGenerator {
    pub fn new(provider: Arc<dyn VideoProvider>, poll: PollPolicy) -> Self {
        Self { provider, poll }
    }

    pub async fn generate(
        &self,
        api_key: Option<&str>,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>> {
        self.generate_with_progress(api_key, request, |_| {}).await
    }

    pub async fn generate_with_progress<F>(
        &self,
        api_key: Option<&str>,
        request: &GenerationRequest,
        mut on_phase: F,
    ) -> Result<Vec<u8>>
    where
        F: FnMut(Phase) + Send,
    {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(VeoError::MissingCredential)?;

        let _timer = logger::timer(&format!("generate {}", request.model().id));

        on_phase(Phase::Submitting);
        let mut operation = self.provider.start_generation(api_key, request).await?;

        log::info!("Polling for video result...");
        let mut attempts = 0u32;
        while !operation.done {
            if let Some(max) = self.poll.max_attempts {
                if attempts >= max {
                    log::warn!(
                        "Giving up on {} after {} status checks",
                        operation.name,
                        attempts
                    );
                    return Err(VeoError::PollTimeout { attempts });
                }
            }

            tokio::time::sleep(self.poll.interval).await;
            attempts += 1;
            operation = self.provider.poll_operation(api_key, &operation).await?;
            log::debug!(
                "Current operation status: {} (check {})",
                operation.state().unwrap_or("unknown"),
                attempts
            );

            if !operation.done {
                on_phase(Phase::Polling {
                    attempt: attempts,
                    state: operation.state().map(String::from),
                });
            }
        }

        if let Some(error) = operation.error.take() {
            log::error!("Operation {} failed: {}", operation.name, error.message);
            return Err(VeoError::Generation(error.message));
        }

        let uri = match operation.video_uri() {
            Some(uri) => uri.to_string(),
            None => {
                if let Some(reasons) = operation.filtered_reasons() {
                    log::warn!("Samples were filtered: {}", reasons.join("; "));
                }
                return Err(VeoError::NoAssetLocation);
            }
        };

        on_phase(Phase::Downloading);
        let video = self.provider.fetch_video(api_key, &uri).await?;
        log::info!("Video ready: {} bytes after {} status checks", video.len(), attempts);
        Ok(video)
    }
}
