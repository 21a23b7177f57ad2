//! The request-scoped context tying the pieces together: it owns the
//! provider, the credential store, the download sink and the two in-flight
//! flags, and turns orchestrator progress into UI-facing state.

use crate::{
    batch::{BatchEvent, BatchSequencer},
    config::Config,
    error::{Result, VeoError},
    messages::{self, Locale},
    models::{BatchForm, BatchReport, GenerationForm, GenerationRequest, ImagePayload},
    storage::{CredentialStore, DirectoryDownloader, DownloadSink, FileCredentialStore},
    translator,
    veo::{GeminiClient, Phase, VideoGenerator, VideoProvider},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of asking the studio to start work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    Accepted(T),
    /// Another run of the same kind is in flight; nothing was done.
    AlreadyRunning,
    /// The form held nothing to process.
    Empty,
}

impl<T> Submission<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            Submission::Accepted(value) => Some(value),
            _ => None,
        }
    }
}

/// State of a single generation as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Submitting,
    Polling { attempt: u32, message: String },
    Downloading,
    Succeeded { video: Vec<u8> },
    Failed { message: String },
}

impl GenerationState {
    pub fn from_phase(phase: Phase, locale: Locale) -> Self {
        match phase {
            Phase::Submitting => GenerationState::Submitting,
            Phase::Polling { attempt, .. } => GenerationState::Polling {
                attempt,
                message: messages::loading_message(locale, attempt).to_string(),
            },
            Phase::Downloading => GenerationState::Downloading,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Succeeded { .. } | GenerationState::Failed { .. }
        )
    }
}

/// Holds a flag for as long as it lives.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Studio {
    config: Config,
    provider: Arc<dyn VideoProvider>,
    credentials: Arc<dyn CredentialStore>,
    downloads: Arc<dyn DownloadSink>,
    generating: AtomicBool,
    batching: AtomicBool,
}

impl Studio {
    pub fn new(
        config: Config,
        provider: Arc<dyn VideoProvider>,
        credentials: Arc<dyn CredentialStore>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            config,
            provider,
            credentials,
            downloads,
            generating: AtomicBool::new(false),
            batching: AtomicBool::new(false),
        }
    }

    /// Gemini client, credential file and output directory from `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = Arc::new(GeminiClient::new(&config.veo)?);
        let credentials = Arc::new(FileCredentialStore::new(&config.credential_path));
        let downloads = Arc::new(DirectoryDownloader::new(&config.output_dir));
        Ok(Self::new(config, provider, credentials, downloads))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// The configured key wins over the stored one.
    pub async fn api_key(&self) -> Result<Option<String>> {
        if let Some(key) = &self.config.api_key {
            return Ok(Some(key.clone()));
        }
        self.credentials.load().await
    }

    pub async fn has_key(&self) -> bool {
        matches!(self.api_key().await, Ok(Some(_)))
    }

    pub async fn save_key(&self, key: &str) -> Result<()> {
        self.credentials.save(key).await
    }

    pub async fn clear_key(&self) -> Result<()> {
        self.credentials.clear().await
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub fn is_batch_running(&self) -> bool {
        self.batching.load(Ordering::Acquire)
    }

    fn generator(&self) -> VideoGenerator {
        VideoGenerator::new(self.provider.clone(), self.config.veo.poll)
    }

    async fn require_key(&self) -> Result<String> {
        self.api_key().await?.ok_or(VeoError::MissingCredential)
    }

    /// Runs one generation. Provider failures come back as
    /// `GenerationState::Failed` with a translated message; only a missing
    /// key or an invalid form is an `Err`.
    pub async fn generate<F>(
        &self,
        form: &GenerationForm,
        mut on_state: F,
    ) -> Result<Submission<GenerationState>>
    where
        F: FnMut(&GenerationState) + Send,
    {
        let api_key = self.require_key().await?;
        let Some(_guard) = InFlight::acquire(&self.generating) else {
            log::warn!("A generation is already running, ignoring submission");
            return Ok(Submission::AlreadyRunning);
        };

        let model = form.model()?;
        let image = match &form.image {
            Some(path) if model.supports_image => Some(ImagePayload::from_path(path).await?),
            Some(path) => {
                log::warn!("{} does not take images, ignoring {}", model.id, path.display());
                None
            }
            None => None,
        };
        let request = GenerationRequest::build(form, image)?;

        let locale = self.locale();
        let result = self
            .generator()
            .generate_with_progress(Some(&api_key), &request, |phase| {
                on_state(&GenerationState::from_phase(phase, locale));
            })
            .await;

        let state = match result {
            Ok(video) => GenerationState::Succeeded { video },
            Err(e) => {
                log::error!("Generation failed: {}", e);
                GenerationState::Failed {
                    message: translator::translate_error(&e, locale),
                }
            }
        };
        on_state(&state);

        Ok(Submission::Accepted(state))
    }

    /// Runs a batch. Returns `AlreadyRunning` without side effects while
    /// another batch holds the flag, which stays set until the status is
    /// cleared.
    pub async fn run_batch<F>(
        &self,
        form: &BatchForm,
        on_event: F,
    ) -> Result<Submission<BatchReport>>
    where
        F: FnMut(BatchEvent) + Send,
    {
        let api_key = self.require_key().await?;
        if form.items().is_empty() {
            return Ok(Submission::Empty);
        }
        let Some(_guard) = InFlight::acquire(&self.batching) else {
            log::warn!("A batch is already running, ignoring submission");
            return Ok(Submission::AlreadyRunning);
        };

        let sequencer = BatchSequencer::new(
            self.generator(),
            self.downloads.clone(),
            self.config.batch,
            self.locale(),
        );
        let report = sequencer.run(&api_key, form, on_event).await;
        Ok(Submission::Accepted(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;
    use crate::storage::MemoryCredentialStore;
    use crate::testing::{RecordingSink, ScriptedProvider};
    use reqwest::StatusCode;

    fn studio(
        config: Config,
        provider: Arc<ScriptedProvider>,
        credentials: MemoryCredentialStore,
    ) -> (Studio, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let studio = Studio::new(config, provider, Arc::new(credentials), sink.clone());
        (studio, sink)
    }

    #[tokio::test]
    async fn missing_key_is_reported_before_any_call() {
        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(Config::new(), provider.clone(), MemoryCredentialStore::new());

        let err = studio
            .generate(&GenerationForm::new("a cat"), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, VeoError::MissingCredential));

        let err = studio
            .run_batch(&BatchForm::new("a\nb"), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, VeoError::MissingCredential));

        assert!(provider.spans().is_empty());
        assert!(!studio.is_generating());
        assert!(!studio.is_batch_running());
    }

    #[tokio::test]
    async fn configured_key_overrides_stored_key() {
        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(
            Config::new().with_api_key("from-env"),
            provider,
            MemoryCredentialStore::with_key("stored"),
        );
        assert_eq!(studio.api_key().await.unwrap().as_deref(), Some("from-env"));
    }

    #[tokio::test]
    async fn key_lifecycle() {
        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(Config::new(), provider, MemoryCredentialStore::new());
        assert!(!studio.has_key().await);
        studio.save_key(" k ").await.unwrap();
        assert_eq!(studio.api_key().await.unwrap().as_deref(), Some("k"));
        studio.clear_key().await.unwrap();
        assert!(!studio.has_key().await);
    }

    #[tokio::test(start_paused = true)]
    async fn generation_walks_the_state_machine() {
        let provider = Arc::new(ScriptedProvider::new().with_pending_polls(1));
        let (studio, _) = studio(
            Config::new().with_locale(Locale::En),
            provider,
            MemoryCredentialStore::with_key("k"),
        );
        let mut states = Vec::new();

        let outcome = studio
            .generate(&GenerationForm::new("a cat"), |state| states.push(state.clone()))
            .await
            .unwrap();

        let expected = GenerationState::Succeeded {
            video: b"video:a cat".to_vec(),
        };
        assert_eq!(outcome, Submission::Accepted(expected.clone()));
        assert_eq!(
            states,
            vec![
                GenerationState::Submitting,
                GenerationState::Polling {
                    attempt: 1,
                    message: messages::loading_message(Locale::En, 1).to_string(),
                },
                GenerationState::Downloading,
                expected,
            ]
        );
        assert!(!studio.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_come_back_translated_and_retryable() {
        let provider = Arc::new(
            ScriptedProvider::new().rejecting("a cat", StatusCode::SERVICE_UNAVAILABLE),
        );
        let (studio, _) = studio(Config::new(), provider, MemoryCredentialStore::with_key("k"));

        for _ in 0..2 {
            let state = studio
                .generate(&GenerationForm::new("a cat"), |_| {})
                .await
                .unwrap()
                .accepted()
                .unwrap();
            assert_eq!(
                state,
                GenerationState::Failed {
                    message: "Layanan Google Lagi Tidur Bang. Coba lagi nanti.".into()
                }
            );
            assert!(state.is_terminal());
        }
    }

    #[tokio::test]
    async fn invalid_form_is_an_error() {
        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(Config::new(), provider, MemoryCredentialStore::with_key("k"));
        let form = GenerationForm::new("a cat").with_model("veo-3.0-generate-preview").with_video_count(2);

        let err = studio.generate(&form, |_| {}).await.unwrap_err();
        assert!(matches!(err, VeoError::InvalidRequest(_)));
        assert!(!studio.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn image_is_attached_for_capable_models() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("ref.jpg");
        std::fs::write(&image, [0xff, 0xd8]).unwrap();

        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(
            Config::new(),
            provider.clone(),
            MemoryCredentialStore::with_key("k"),
        );

        studio
            .generate(&GenerationForm::new("a cat").with_image(&image), |_| {})
            .await
            .unwrap();
        assert_eq!(provider.images(), vec![Some("image/jpeg".to_string())]);
    }

    #[tokio::test]
    async fn blank_batch_is_empty() {
        let provider = Arc::new(ScriptedProvider::new());
        let (studio, _) = studio(Config::new(), provider, MemoryCredentialStore::with_key("k"));
        let outcome = studio.run_batch(&BatchForm::new("\n  \n"), |_| {}).await.unwrap();
        assert_eq!(outcome, Submission::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn second_batch_is_ignored_while_one_runs() {
        let provider = Arc::new(ScriptedProvider::new().with_pending_polls(2));
        let (studio, sink) = studio(Config::new(), provider, MemoryCredentialStore::with_key("k"));
        let studio = Arc::new(studio);

        let running = studio.clone();
        let first = tokio::spawn(async move {
            running
                .run_batch(&BatchForm::new("one\ntwo"), |_| {})
                .await
        });

        while !studio.is_batch_running() {
            tokio::task::yield_now().await;
        }

        let second = studio
            .run_batch(&BatchForm::new("three"), |_| {})
            .await
            .unwrap();
        assert_eq!(second, Submission::AlreadyRunning);

        let report = first.await.unwrap().unwrap().accepted().unwrap();
        assert_eq!(report.succeeded(), 2);
        assert_eq!(sink.filenames(), vec!["1_one.mp4", "2_two.mp4"]);
        assert!(!studio.is_batch_running());
    }

    #[tokio::test(start_paused = true)]
    async fn second_generation_is_ignored_while_one_runs() {
        let provider = Arc::new(ScriptedProvider::new().with_pending_polls(3));
        let (studio, _) = studio(Config::new(), provider, MemoryCredentialStore::with_key("k"));
        let studio = Arc::new(studio);

        let running = studio.clone();
        let first = tokio::spawn(async move {
            running.generate(&GenerationForm::new("slow"), |_| {}).await
        });

        while !studio.is_generating() {
            tokio::task::yield_now().await;
        }

        let second = studio
            .generate(&GenerationForm::new("fast"), |_| {})
            .await
            .unwrap();
        assert_eq!(second, Submission::AlreadyRunning);
        assert!(first.await.unwrap().unwrap().accepted().unwrap().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_report_lists_every_slot() {
        let provider = Arc::new(
            ScriptedProvider::new().rejecting("b", StatusCode::TOO_MANY_REQUESTS),
        );
        let (studio, sink) = studio(
            Config::new().with_locale(Locale::En),
            provider,
            MemoryCredentialStore::with_key("k"),
        );
        let mut events = Vec::new();

        let report = studio
            .run_batch(&BatchForm::new("a\nb\nc"), |event| events.push(event))
            .await
            .unwrap()
            .accepted()
            .unwrap();

        assert_eq!(sink.delivered().len(), 2);
        assert_eq!(
            report.items[1].status,
            ItemStatus::Failed {
                message: "Easy there, give it a rest. You are sending requests too often.".into()
            }
        );
        assert!(events.contains(&BatchEvent::Status("Batch processing finished!".into())));
    }
}
