use thiserror::Error;

use super::sections::Section;

/// Errors surfaced by the grading core.
///
/// None of these are fatal to a running session: an unavailable configuration
/// leaves the engine inert, and out-of-range input is clamped before use.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GradeError {
    /// The grading document could not be fetched, parsed, or validated.
    #[error("grading configuration unavailable from {origin}: {reason}")]
    ConfigUnavailable { origin: String, reason: String },

    /// The grading document parsed but broke one or more rules.
    #[error("invalid grading configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Input exceeded the section maximum and was clamped to it.
    #[error("Maximum mark for {} is {max}!", .section.label())]
    InputOutOfRange { section: Section, max: f64 },
}

impl GradeError {
    pub fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        GradeError::ConfigUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
