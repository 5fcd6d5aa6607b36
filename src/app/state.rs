use crate::adapter::nlc::NlcClient;
use crate::config::{Settings, UploadSettings};
use crate::error::FrontendError;
use crate::port::Classifier;
use crate::upload::UploadReceiver;
use std::sync::Arc;

/// Shared, immutable state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub uploads: Arc<UploadReceiver>,
    pub max_rows: usize,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, upload: &UploadSettings) -> Self {
        Self {
            classifier,
            uploads: Arc::new(UploadReceiver::new(upload)),
            max_rows: upload.max_rows,
        }
    }

    /// Create `AppState` from configuration settings, building the
    /// classifier client once for the life of the process.
    pub fn from_settings(settings: &Settings) -> Result<Self, FrontendError> {
        let client = NlcClient::new(&settings.classifier)?;
        ::tracing::info!(endpoint = %client.endpoint(), "Classifier client ready");
        Ok(Self::new(Arc::new(client), &settings.upload))
    }
}
