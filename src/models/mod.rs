pub mod settings;
pub mod wallet;
pub mod api;
pub mod fault;
pub mod reconciliation;

use crate::models::fault::InsufficientFundsFault;

// Progress/notification updates emitted by long-running actions.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Started(String), // Action label
    Log(String),
    Success(String),
    Failure(String), // Operator-facing message
    Fault(InsufficientFundsFault),
    BatchSummary {
        label: String,
        successful: usize,
        failed: usize,
    },
}

impl OperationStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, OperationStatus::Failure(_) | OperationStatus::Fault(_))
    }
}
