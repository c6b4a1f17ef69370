//! Error types for the domain core.

use crate::workflow::AnalysisStage;

/// Errors raised by the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A workflow operation was attempted out of order.
    #[error("illegal stage transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: AnalysisStage,
        to: AnalysisStage,
    },

    /// An operation that needs a selected client ran without one.
    #[error("no client selected")]
    NoClientSelected,

    /// Questionnaire scores were submitted before any script scores exist.
    #[error("script scores are required before questionnaire scores")]
    ScriptScoresMissing,

    /// Weight outside the [0,100] percentage range.
    #[error("weight must be between 0 and 100, got {0}")]
    InvalidWeight(i64),

    /// A required input field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl CoreError {
    /// Whether this error is an input-validation failure (reportable inline,
    /// no remote call involved).
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidWeight(_) | Self::MissingField(_))
    }
}
