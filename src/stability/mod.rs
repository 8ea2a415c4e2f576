pub mod payload;
pub mod transport;

use crate::{
    config::StabilityConfig,
    error::{Result, StabilityError},
    logger,
    models::{GeneratedArtifact, GenerationRequest, ModelInfo, Model},
    storage::{artifact_file_name, ArtifactStore, DirectoryStore},
};
use chrono::Local;
use std::sync::Arc;

pub use payload::{build_call, endpoint_for, ApiCall, ImagePart};
pub use transport::{ApiResponse, HttpTransport, ImageTransport};

#[derive(Clone)]
pub struct StabilityClient {
    config: Arc<StabilityConfig>,
    transport: Arc<dyn ImageTransport>,
    store: Arc<dyn ArtifactStore>,
}

impl StabilityClient {
    /// Client backed by reqwest and the configured output directory.
    pub fn new(config: StabilityConfig) -> Self {
        let store = DirectoryStore::new(config.output_dir.clone());
        Self::with_backends(config, Arc::new(HttpTransport::new()), Arc::new(store))
    }

    pub fn with_backends(
        config: StabilityConfig,
        transport: Arc<dyn ImageTransport>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            store,
        }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        Model::supported()
    }

    /// Sends one generation call and saves the response body.
    ///
    /// Any status other than 200 becomes `GenerationFailed` carrying the
    /// service's error body, and nothing is written.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GeneratedArtifact> {
        let call = build_call(&self.config, &request);
        let sent_fields = call.metadata.clone();

        log::info!(
            "Generating image with model: {} ({})",
            request.model,
            request.mode.as_str()
        );

        let response = {
            let _timer = logger::timer(&format!("{} {}", request.model, call.url));
            self.transport.send(call).await?
        };

        if !response.is_ok() {
            let err = StabilityError::generation_failed(response.status, &response.body);
            log::error!("{}", err);
            return Err(err);
        }

        let extension = request.output_format.extension();
        let file_name = artifact_file_name(Local::now(), extension);
        let path = self.store.save(&file_name, &response.body).await?;

        log::debug!("Request fields: {}", sent_fields);
        log::info!("Image saved to {}", path.display());

        Ok(GeneratedArtifact {
            path,
            extension: extension.to_string(),
            size_bytes: response.body.len(),
            model: request.model,
        })
    }
}
