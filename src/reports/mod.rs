pub mod query;
pub mod submission;

use thiserror::Error;

pub use query::{ListReportsParams, ReportQuery, SortKey, SortOrder};
pub use submission::{CameraSource, ReportForm, ReportSubmission, MAX_DESCRIPTION_WORDS};

/// Rejected client input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
