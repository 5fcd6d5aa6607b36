//! Shared test support utilities
//!
//! Provides a deterministic `StubClassifier` standing in for the remote
//! service in unit and integration tests.

use crate::domain::{ClassificationResult, TextRecord};
use crate::error::ClassificationError;
use crate::port::{Classifier, ClassifyFuture};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Label the stub assigns to `text`.
pub fn label_for(text: &str) -> String {
    format!("len{}", text.chars().count())
}

/// Classifier stub that labels every text with [`label_for`].
///
/// Failures can be switched on per mode, and every request is recorded.
pub struct StubClassifier {
    calls: Mutex<Vec<Vec<String>>>,
    should_fail: AtomicBool,
    should_time_out: AtomicBool,
    reverse_results: AtomicBool,
}

impl StubClassifier {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
            should_time_out: AtomicBool::new(false),
            reverse_results: AtomicBool::new(false),
        }
    }

    /// Answer with an upstream error status.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Answer with a timeout error.
    pub fn set_should_time_out(&self, time_out: bool) {
        self.should_time_out.store(time_out, Ordering::SeqCst);
    }

    /// Return results in reverse input order.
    pub fn set_reverse_results(&self, reverse: bool) {
        self.reverse_results.store(reverse, Ordering::SeqCst);
    }

    /// Texts of every classify call received so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for StubClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for StubClassifier {
    fn classify_collection<'a>(&'a self, records: &'a [TextRecord]) -> ClassifyFuture<'a> {
        Box::pin(async move {
            let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
            self.calls.lock().unwrap().push(texts);

            if self.should_time_out.load(Ordering::SeqCst) {
                return Err(ClassificationError::Timeout(
                    "stub classifier timed out".to_string(),
                ));
            }
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(ClassificationError::Status {
                    status: 503,
                    body: "stub classifier unavailable".to_string(),
                });
            }

            let mut results: Vec<ClassificationResult> = records
                .iter()
                .map(|r| ClassificationResult::new(r.text.clone(), Some(label_for(&r.text))))
                .collect();
            if self.reverse_results.load(Ordering::SeqCst) {
                results.reverse();
            }
            Ok(results)
        })
    }
}
