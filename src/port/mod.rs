pub mod classifier;

pub use classifier::{Classifier, ClassifyFuture};
