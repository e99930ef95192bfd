use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmiPlannerError {
    #[error("Invalid input: {field} — {reason}")]
    Validation { field: String, reason: String },

    #[error("Calculation failed: {0}")]
    Calculation(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EmiPlannerError {
    /// True when the request was rejected before any schedule was computed.
    pub fn is_validation(&self) -> bool {
        matches!(self, EmiPlannerError::Validation { .. })
    }

    /// True for numeric failures raised while building the schedule.
    ///
    /// Date arithmetic that leaves the calendar's range counts as a
    /// calculation failure for callers.
    pub fn is_calculation(&self) -> bool {
        matches!(
            self,
            EmiPlannerError::Calculation(_) | EmiPlannerError::DateError(_)
        )
    }

    /// Decimal arithmetic that left the representable range.
    pub(crate) fn overflow(context: impl std::fmt::Display) -> Self {
        EmiPlannerError::Calculation(format!("{context} overflows the decimal range"))
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EmiPlannerError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EmiPlannerError {
    fn from(e: serde_json::Error) -> Self {
        EmiPlannerError::SerializationError(e.to_string())
    }
}
