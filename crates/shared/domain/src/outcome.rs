//! Result shape reported by the CRUD services.

/// Outcome of a store operation that reached the store and got an answer.
///
/// Transport faults are not represented here; they surface as errors from
/// the calling service instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResult {
    Success { message: Option<String> },
    Error { reason: String },
}

impl ServiceResult {
    pub fn success() -> Self {
        ServiceResult::Success { message: None }
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        ServiceResult::Success {
            message: Some(message.into()),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        ServiceResult::Error {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success { .. })
    }
}
