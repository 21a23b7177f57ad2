use crate::{
    config::VeoConfig,
    error::{Result, VeoError},
    models::{GenerationRequest, Operation},
    veo::VideoProvider,
};
use async_trait::async_trait;
use reqwest::Response;

/// REST client for the Gemini API's Veo endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &VeoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("veogen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VeoError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn create_url(&self, model_id: &str) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url, model_id)
    }

    pub fn operation_url(&self, operation_name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            operation_name.trim_start_matches('/')
        )
    }

    async fn read_operation(response: Response) -> Result<Operation> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeoError::Api { status, body });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VideoProvider for GeminiClient {
    async fn start_generation(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<Operation> {
        let model_id = request.model().id;
        let payload = request.to_payload();

        log::info!(
            "Starting video generation with model: {} ({} video(s), {}, image: {})",
            model_id,
            request.options().video_count,
            request.options().aspect_ratio,
            request.image().is_some()
        );

        let response = self
            .client
            .post(self.create_url(model_id))
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;

        let operation = Self::read_operation(response).await?;
        log::debug!("Operation created: {}", operation.name);
        Ok(operation)
    }

    async fn poll_operation(&self, api_key: &str, operation: &Operation) -> Result<Operation> {
        let response = self
            .client
            .get(self.operation_url(&operation.name))
            .query(&[("key", api_key)])
            .send()
            .await?;

        Self::read_operation(response).await
    }

    async fn fetch_video(&self, api_key: &str, uri: &str) -> Result<Vec<u8>> {
        log::info!("Fetching generated video from: {}", uri);

        let response = self
            .client
            .get(uri)
            .query(&[("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeoError::AssetFetch { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
