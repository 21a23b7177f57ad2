//! Scripted provider and recording download sink used by unit tests.

use crate::{
    error::{Result, VeoError},
    models::{GenerationRequest, Operation},
    storage::DownloadSink,
    veo::VideoProvider,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How a job ends once it stops reporting "running".
#[derive(Debug, Clone)]
pub enum Outcome {
    Video,
    Failed(String),
    NoUri,
    FetchFails(StatusCode),
}

/// One generation from submission to its last provider call.
#[derive(Debug, Clone)]
pub struct Span {
    pub prompt: String,
    pub started: Instant,
    pub finished: Option<Instant>,
}

pub struct ScriptedProvider {
    pending_polls: u32,
    start_delay: Duration,
    outcome: Outcome,
    initial: Option<Operation>,
    rejections: HashMap<String, StatusCode>,
    counter: AtomicU32,
    polls: AtomicU32,
    fetches: AtomicU32,
    remaining: Mutex<HashMap<String, u32>>,
    last_prompt: Mutex<Option<String>>,
    poll_times: Mutex<Vec<Instant>>,
    spans: Mutex<Vec<Span>>,
    images: Mutex<Vec<Option<String>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            pending_polls: 0,
            start_delay: Duration::ZERO,
            outcome: Outcome::Video,
            initial: None,
            rejections: HashMap::new(),
            counter: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            fetches: AtomicU32::new(0),
            remaining: Mutex::new(HashMap::new()),
            last_prompt: Mutex::new(None),
            poll_times: Mutex::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
        }
    }

    /// Status checks that still report "running" before the job ends.
    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_initial(mut self, operation: Operation) -> Self {
        self.initial = Some(operation);
        self
    }

    /// Job creation for `prompt` fails with `status`.
    pub fn rejecting(mut self, prompt: &str, status: StatusCode) -> Self {
        self.rejections.insert(prompt.to_string(), status);
        self
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().unwrap().clone()
    }

    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().unwrap().clone()
    }

    /// MIME type of the image sent with each submission, in call order.
    pub fn images(&self) -> Vec<Option<String>> {
        self.images.lock().unwrap().clone()
    }

    fn finish(&self, prompt: &str) {
        let mut spans = self.spans.lock().unwrap();
        if let Some(span) = spans
            .iter_mut()
            .rev()
            .find(|span| span.prompt == prompt && span.finished.is_none())
        {
            span.finished = Some(Instant::now());
        }
    }

    fn running(name: &str) -> Operation {
        Operation {
            metadata: Some(json!({ "state": "RUNNING" })),
            ..Operation::pending(name)
        }
    }

    fn terminal(&self, name: &str) -> Operation {
        match &self.outcome {
            Outcome::Video | Outcome::FetchFails(_) => Operation::completed_with_uri(
                name,
                format!("https://files.test/{}:download?alt=media", name),
            ),
            Outcome::Failed(message) => Operation::failed(name, 13, message.clone()),
            Outcome::NoUri => Operation {
                done: true,
                ..Operation::pending(name)
            },
        }
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    async fn start_generation(
        &self,
        _api_key: &str,
        request: &GenerationRequest,
    ) -> Result<Operation> {
        let prompt = request.prompt().to_string();
        self.spans.lock().unwrap().push(Span {
            prompt: prompt.clone(),
            started: Instant::now(),
            finished: None,
        });
        self.images
            .lock()
            .unwrap()
            .push(request.image().map(|image| image.mime_type.clone()));

        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }

        if let Some(status) = self.rejections.get(&prompt) {
            self.finish(&prompt);
            return Err(VeoError::Api {
                status: *status,
                body: json!({ "error": { "code": status.as_u16(), "message": "rejected" } })
                    .to_string(),
            });
        }

        *self.last_prompt.lock().unwrap() = Some(prompt);

        if let Some(initial) = &self.initial {
            return Ok(initial.clone());
        }

        let name = format!("operations/{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.remaining
            .lock()
            .unwrap()
            .insert(name.clone(), self.pending_polls);
        Ok(Self::running(&name))
    }

    async fn poll_operation(&self, _api_key: &str, operation: &Operation) -> Result<Operation> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().unwrap().push(Instant::now());

        let mut remaining = self.remaining.lock().unwrap();
        let left = remaining.entry(operation.name.clone()).or_insert(0);
        if *left > 0 {
            *left -= 1;
            return Ok(Self::running(&operation.name));
        }
        drop(remaining);

        let terminal = self.terminal(&operation.name);
        if !matches!(self.outcome, Outcome::Video | Outcome::FetchFails(_)) {
            if let Some(prompt) = self.last_prompt.lock().unwrap().clone() {
                self.finish(&prompt);
            }
        }
        Ok(terminal)
    }

    async fn fetch_video(&self, _api_key: &str, _uri: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let prompt = self.last_prompt.lock().unwrap().clone().unwrap_or_default();
        self.finish(&prompt);

        if let Outcome::FetchFails(status) = &self.outcome {
            return Err(VeoError::AssetFetch {
                status: *status,
                body: "expired".into(),
            });
        }
        Ok(format!("video:{}", prompt).into_bytes())
    }
}

/// Keeps every delivered video in memory.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub fn filenames(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn delivered(&self) -> Vec<(String, Vec<u8>)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.delivered
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("downloads").join(filename))
    }
}
