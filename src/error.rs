//! Error types shared by the context, project and generation layers

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by Palette's core operations
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Invalid token budget: total {total} must exceed reserved {reserved}")]
    InvalidBudget { total: usize, reserved: usize },

    #[error("Failed to detect project configuration in {path}: {reason}")]
    Detection { path: PathBuf, reason: String },

    #[error("Failed to analyze project: {0}")]
    Analysis(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PaletteResult<T> = std::result::Result<T, PaletteError>;

/// Fallback posture for call sites that prefer a default over an error.
///
/// Propagating with `?` is the re-raise posture; `or_fallback_with` logs the
/// failure and substitutes a value instead.
pub trait ResultExt<T> {
    fn or_fallback_with<F: FnOnce() -> T>(self, fallback: F, what: &str) -> T;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn or_fallback_with<F: FnOnce() -> T>(self, fallback: F, what: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} unavailable, using defaults: {}", what, e);
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_fallback_passes_ok_through() {
        let ok: Result<u32, PaletteError> = Ok(7);
        assert_eq!(ok.or_fallback_with(|| 0, "value"), 7);
    }

    #[test]
    fn test_or_fallback_substitutes_on_error() {
        let err: Result<u32, PaletteError> = Err(PaletteError::Generation("boom".into()));
        assert_eq!(err.or_fallback_with(|| 3, "value"), 3);
    }

    #[test]
    fn test_budget_error_message() {
        let err = PaletteError::InvalidBudget { total: 100, reserved: 500 };
        assert!(err.to_string().contains("total 100"));
    }
}
