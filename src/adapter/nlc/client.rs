use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, info};

use super::wire::{ClassifyCollectionRequest, ClassifyCollectionResponse, CollectionText};
use crate::config::{ClassifierSettings, Credentials};
use crate::domain::{ClassificationResult, TextRecord};
use crate::error::ClassificationError;
use crate::port::{Classifier, ClassifyFuture};

/// HTTP client for `POST /v1/classifiers/{id}/classify_collection`.
#[derive(Debug, Clone)]
pub struct NlcClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl NlcClient {
    /// Build the client once at start-up.
    ///
    /// # Errors
    /// Returns [`ClassificationError::Config`] when the base URL cannot carry
    /// a path or the HTTP client cannot be built.
    pub fn new(settings: &ClassifierSettings) -> Result<Self, ClassificationError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                ClassificationError::Config(format!("failed to build HTTP client: {e}"))
            })?;

        let endpoint = classify_collection_url(&settings.url, &settings.classifier_id)?;

        Ok(Self {
            client,
            endpoint,
            credentials: settings.credentials.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::ApiKey(key) => request.basic_auth("apikey", Some(key)),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    async fn classify(
        &self,
        records: &[TextRecord],
    ) -> Result<Vec<ClassificationResult>, ClassificationError> {
        let body = ClassifyCollectionRequest {
            collection: records
                .iter()
                .map(|record| CollectionText {
                    text: &record.text,
                })
                .collect(),
        };

        debug!(rows = records.len(), endpoint = %self.endpoint, "Sending classify_collection request");

        let response = self
            .authorize(self.client.post(self.endpoint.clone()).json(&body))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ClassifyCollectionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClassificationError::Timeout(e.to_string())
            } else {
                ClassificationError::Decode(e.to_string())
            }
        })?;

        info!(rows = parsed.collection.len(), "Classifier returned results");
        Ok(parsed.collection.into_iter().map(Into::into).collect())
    }
}

impl Classifier for NlcClient {
    fn classify_collection<'a>(&'a self, records: &'a [TextRecord]) -> ClassifyFuture<'a> {
        Box::pin(self.classify(records))
    }
}

fn request_error(err: reqwest::Error) -> ClassificationError {
    if err.is_timeout() {
        ClassificationError::Timeout(err.to_string())
    } else {
        ClassificationError::Transport(err.to_string())
    }
}

/// `{base}/v1/classifiers/{classifier_id}/classify_collection`, with the id
/// percent-encoded as a single path segment.
fn classify_collection_url(base: &str, classifier_id: &str) -> Result<Url, ClassificationError> {
    let mut url = Url::parse(base)
        .map_err(|e| ClassificationError::Config(format!("invalid classifier URL {base}: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| ClassificationError::Config(format!("classifier URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(["v1", "classifiers", classifier_id, "classify_collection"]);

    Ok(url)
}
