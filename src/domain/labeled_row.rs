use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::{ClassificationResult, TextRecord};
use crate::error::ClassificationError;

/// An uploaded row joined with the label the classifier picked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledRow {
    pub record: TextRecord,
    pub top_class: Option<String>,
}

/// Pairs classifier results with the rows they belong to, in input order.
///
/// Results are paired positionally when the service echoed every text at the
/// position it was sent. Otherwise each row takes the first unused result
/// whose echoed text equals its own. Any row left without a result is a
/// [`ClassificationError::Mismatch`].
pub fn pair_in_input_order(
    records: Vec<TextRecord>,
    results: Vec<ClassificationResult>,
) -> Result<Vec<LabeledRow>, ClassificationError> {
    if records.len() != results.len() {
        return Err(ClassificationError::Mismatch(format!(
            "received {} results for {} rows",
            results.len(),
            records.len()
        )));
    }

    let in_order = records
        .iter()
        .zip(&results)
        .all(|(record, result)| record.text == result.text);

    if in_order {
        return Ok(records
            .into_iter()
            .zip(results)
            .map(|(record, result)| LabeledRow {
                record,
                top_class: result.top_class,
            })
            .collect());
    }

    debug!(
        rows = records.len(),
        "Classifier results are not in input order, matching by echoed text"
    );

    let mut by_text: HashMap<String, VecDeque<Option<String>>> = HashMap::new();
    for result in results {
        by_text
            .entry(result.text)
            .or_default()
            .push_back(result.top_class);
    }

    records
        .into_iter()
        .map(|record| {
            let top_class = by_text
                .get_mut(&record.text)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| {
                    ClassificationError::Mismatch(format!(
                        "no result for row {} ({:?})",
                        record.index, record.text
                    ))
                })?;
            Ok(LabeledRow { record, top_class })
        })
        .collect()
}
