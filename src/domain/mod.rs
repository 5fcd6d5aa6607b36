pub mod labeled_row;
pub mod record;

pub use labeled_row::{LabeledRow, pair_in_input_order};
pub use record::{ClassificationResult, TextRecord};
