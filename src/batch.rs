//! Runs a list of prompts one after another, downloading each video as it
//! finishes. A failed item is recorded and skipped; it never stops the run.

use crate::{
    config::BatchConfig,
    error::Result,
    messages::{self, Locale},
    models::{BatchForm, BatchItem, BatchReport, GenerationRequest, ImagePayload, ItemStatus},
    storage::DownloadSink,
    translator,
    veo::VideoGenerator,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Updates emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// New text for the status line.
    Status(String),
    /// The batch's current error after an item failed.
    Error(String),
    /// The status line was taken down after the run.
    Cleared,
}

#[derive(Clone)]
pub struct BatchSequencer {
    generator: VideoGenerator,
    downloads: Arc<dyn DownloadSink>,
    config: BatchConfig,
    locale: Locale,
}

impl BatchSequencer {
    pub fn new(
        generator: VideoGenerator,
        downloads: Arc<dyn DownloadSink>,
        config: BatchConfig,
        locale: Locale,
    ) -> Self {
        Self {
            generator,
            downloads,
            config,
            locale,
        }
    }

    pub async fn run<F>(&self, api_key: &str, form: &BatchForm, mut on_event: F) -> BatchReport
    where
        F: FnMut(BatchEvent) + Send,
    {
        let mut items = form.items();
        let total = items.len();
        let run_id = Uuid::new_v4().to_string();
        let mut last_error = None;

        log::info!("Batch {} started with {} prompt(s)", run_id, total);

        for index in 0..total {
            let position = index + 1;
            self.status(
                &mut on_event,
                messages::batch_processing(self.locale, position, total, &items[index].prompt),
            );

            let outcome = self
                .process(api_key, form, &items[index], total, &mut on_event)
                .await;

            items[index].status = match outcome {
                Ok(file) => ItemStatus::Succeeded { file },
                Err(e) => {
                    log::error!("Error on video {}: {}", position, e);
                    let message = translator::translate_error(&e, self.locale);
                    self.status(
                        &mut on_event,
                        messages::batch_item_failed(self.locale, position, total, &message),
                    );
                    let error = messages::batch_item_error(
                        self.locale,
                        position,
                        &items[index].prompt,
                        &message,
                    );
                    on_event(BatchEvent::Error(error.clone()));
                    last_error = Some(error);
                    ItemStatus::Failed { message }
                }
            };

            if position < total {
                self.status(
                    &mut on_event,
                    messages::batch_waiting(
                        self.locale,
                        position,
                        total,
                        self.config.item_delay.as_secs(),
                    ),
                );
                tokio::time::sleep(self.config.item_delay).await;
            }
        }

        let report = BatchReport {
            run_id,
            items,
            last_error,
        };
        log::info!(
            "Batch {} finished: {} succeeded, {} failed",
            report.run_id,
            report.succeeded(),
            report.failed()
        );

        self.status(&mut on_event, messages::batch_finished(self.locale).to_string());
        tokio::time::sleep(self.config.status_clear_delay).await;
        on_event(BatchEvent::Cleared);

        report
    }

    async fn process<F>(
        &self,
        api_key: &str,
        form: &BatchForm,
        item: &BatchItem,
        total: usize,
        on_event: &mut F,
    ) -> Result<PathBuf>
    where
        F: FnMut(BatchEvent) + Send,
    {
        let position = item.position();

        let image = match &item.image {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.status(
                    on_event,
                    messages::batch_encoding_image(self.locale, position, total, &name),
                );
                Some(ImagePayload::from_path(path).await?)
            }
            None => None,
        };

        let request = GenerationRequest::build(&form.form_for(item), image)?;

        self.status(
            on_event,
            messages::batch_generating(self.locale, position, total),
        );
        let video = self.generator.generate(Some(api_key), &request).await?;

        self.status(
            on_event,
            messages::batch_downloading(self.locale, position, total),
        );
        self.downloads.deliver(&item.filename(), &video).await
    }

    fn status<F>(&self, on_event: &mut F, line: String)
    where
        F: FnMut(BatchEvent),
    {
        log::info!("{}", line);
        on_event(BatchEvent::Status(line));
    }
}
