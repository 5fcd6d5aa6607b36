use serde::{Deserialize, Serialize};

use crate::domain::ClassificationResult;

#[derive(Debug, Serialize)]
pub(super) struct ClassifyCollectionRequest<'a> {
    pub(super) collection: Vec<CollectionText<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionText<'a> {
    pub(super) text: &'a str,
}

/// Only the fields the front end renders; `classes`, `url` and
/// `classifier_id` are ignored.
#[derive(Debug, Deserialize)]
pub(super) struct ClassifyCollectionResponse {
    pub(super) collection: Vec<ClassifiedText>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClassifiedText {
    text: String,
    #[serde(default)]
    top_class: Option<String>,
}

impl From<ClassifiedText> for ClassificationResult {
    fn from(item: ClassifiedText) -> Self {
        ClassificationResult::new(item.text, item.top_class)
    }
}
