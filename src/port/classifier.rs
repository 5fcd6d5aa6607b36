use crate::domain::{ClassificationResult, TextRecord};
use crate::error::ClassificationError;
use std::future::Future;
use std::pin::Pin;

pub type ClassifyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ClassificationResult>, ClassificationError>> + Send + 'a>>;

/// Remote text classifier.
///
/// One call classifies the whole collection. Implementations return one
/// result per record; the order of the results is not relied upon.
///
/// This trait is dyn-compatible by using boxed futures instead of `impl Future`.
pub trait Classifier: Send + Sync {
    fn classify_collection<'a>(&'a self, records: &'a [TextRecord]) -> ClassifyFuture<'a>;
}
