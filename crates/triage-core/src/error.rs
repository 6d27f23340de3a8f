use thiserror::Error;

/// Caller-correctable input problems. Never retried, always reported back
/// with enough detail to fix the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symptoms are required")]
    MissingSymptoms,

    #[error("sex is required and must be either male or female")]
    MissingSex,

    #[error("invalid sex '{0}': must be either male or female")]
    InvalidSex(String),

    #[error("sex '{sex}' and gender '{gender}' disagree")]
    ConflictingSex { sex: String, gender: String },

    #[error("severity is required and must be one of low, medium, high")]
    MissingSeverity,

    #[error("invalid severity '{0}': must be one of low, medium, high")]
    InvalidSeverity(String),

    #[error("invalid age '{0}': must be a non-negative integer")]
    InvalidAge(String),
}
