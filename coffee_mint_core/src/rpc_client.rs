// Ledger RPC abstraction - the mint flow only sees this trait

use crate::error::CoreError;
use crate::models::{LedgerStatus, SignedTransaction};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, CoreError>;

/// The ledger refused or never received a signed transaction.
///
/// `code` is set when preflight simulation surfaced a program error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionFailure {
    pub code: Option<u32>,
    pub message: String,
}

impl SubmissionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: u32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Remote ledger operations used while minting.
///
/// Futures are not required to be `Send`; a mint runs on a single task.
#[async_trait(?Send)]
pub trait LedgerClient {
    /// Get latest blockhash
    async fn get_latest_blockhash(&self) -> RpcResult<String>;

    /// Send a signed transaction, returning its signature. Does not wait
    /// for confirmation.
    async fn submit(&self, transaction: &SignedTransaction) -> Result<String, SubmissionFailure>;

    /// Status of several signatures at once, in input order.
    async fn get_signature_statuses(&self, signatures: &[String]) -> RpcResult<Vec<LedgerStatus>>;

    /// Status of one signature.
    async fn get_status(&self, signature: &str) -> RpcResult<LedgerStatus> {
        let mut statuses = self
            .get_signature_statuses(&[signature.to_string()])
            .await?;
        if statuses.is_empty() {
            return Err(CoreError::Rpc(format!(
                "no status returned for {}",
                signature
            )));
        }
        Ok(statuses.swap_remove(0))
    }
}
