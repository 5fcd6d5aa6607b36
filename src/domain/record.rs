use serde::{Deserialize, Serialize};

/// One row of the uploaded CSV.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TextRecord {
    /// Position among the classifiable rows, starting at 0.
    pub index: usize,
    pub text: String,
}

impl TextRecord {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A single result returned by the remote classifier.
///
/// `text` is the service's echo of the submitted text. `top_class` is `None`
/// when the service returned no label, or an empty one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClassificationResult {
    pub text: String,
    pub top_class: Option<String>,
}

impl ClassificationResult {
    pub fn new(text: impl Into<String>, top_class: Option<String>) -> Self {
        Self {
            text: text.into(),
            top_class: top_class.filter(|class| !class.is_empty()),
        }
    }
}
