//! Error types.
//!
//! Two layers: [`ConfigError`] for anything detected before the search
//! starts (parameters, input data, unreachable hour quotas) and
//! [`EngineError`] for the run as a whole. Feasibility shortfalls are not
//! errors; they surface as uncovered sessions in the result.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationError;

/// Configuration or input-data error. Aborts the run before the search.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("input validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error(
        "class '{class_id}' needs {required} hours but only {available} slots are open between {start} and {end}"
    )]
    InsufficientSlots {
        class_id: String,
        required: u32,
        available: usize,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Terminal failure of a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Evaluator invariant violated or candidate state corrupted.
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
