//! Error types for the wellness session.

use nutriaura_client::AnalysisError;
use thiserror::Error;

use crate::navigation::Screen;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cannot {action} from the {screen:?} screen")]
    InvalidTransition { action: &'static str, screen: Screen },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("an analysis is already running for this submission")]
    AnalysisInFlight,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for session operations.
pub type AppResult<T> = Result<T, AppError>;
