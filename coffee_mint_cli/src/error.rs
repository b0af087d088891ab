use coffee_mint_core::{ControllerError, CoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid transaction signature {0:?}: {1}")]
    InvalidSignature(String, String),
}
