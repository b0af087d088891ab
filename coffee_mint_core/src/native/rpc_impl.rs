// Native ledger client wrapping solana_client::RpcClient

use crate::error::CoreError;
use crate::models::{FailureReason, LedgerStatus, SignedTransaction};
use crate::rpc_client::{LedgerClient, RpcResult, SubmissionFailure};
use crate::settings::Settings;
use async_trait::async_trait;
use log::debug;
use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient as SolanaRpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::InstructionError;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::str::FromStr;
use std::sync::Arc;

/// Native ledger client wrapping the blocking `solana_client::RpcClient`.
/// Each call runs on tokio's blocking pool.
pub struct NativeLedgerClient {
    client: Arc<SolanaRpcClient>,
    commitment: CommitmentConfig,
}

impl NativeLedgerClient {
    pub fn new(endpoint: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: Arc::new(SolanaRpcClient::new_with_commitment(endpoint, commitment)),
            commitment,
        }
    }

    pub fn from_settings(settings: &Settings) -> RpcResult<Self> {
        let commitment = CommitmentConfig::from_str(&settings.commitment)
            .map_err(|e| CoreError::Validation(format!("Invalid commitment {}: {}", settings.commitment, e)))?;
        Ok(Self::new(settings.rpc_url.clone(), commitment))
    }
}

#[async_trait(?Send)]
impl LedgerClient for NativeLedgerClient {
    async fn get_latest_blockhash(&self) -> RpcResult<String> {
        debug!("Native RPC: get_latest_blockhash");

        let client = self.client.clone();
        let blockhash = tokio::task::spawn_blocking(move || client.get_latest_blockhash())
            .await
            .map_err(|e| CoreError::Rpc(format!("Task join error: {}", e)))?
            .map_err(|e| CoreError::Rpc(format!("get_latest_blockhash failed: {}", e)))?;

        Ok(blockhash.to_string())
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<String, SubmissionFailure> {
        debug!("Native RPC: send_transaction");

        let tx: Transaction = bincode::deserialize(transaction.as_bytes())
            .map_err(|e| SubmissionFailure::new(format!("Failed to deserialize transaction: {}", e)))?;

        let client = self.client.clone();
        let signature = tokio::task::spawn_blocking(move || client.send_transaction(&tx))
            .await
            .map_err(|e| SubmissionFailure::new(format!("Task join error: {}", e)))?
            .map_err(|e| submission_failure(&e))?;

        Ok(signature.to_string())
    }

    async fn get_signature_statuses(&self, signatures: &[String]) -> RpcResult<Vec<LedgerStatus>> {
        debug!("Native RPC: get_signature_statuses for {} signatures", signatures.len());

        let parsed = signatures
            .iter()
            .map(|s| Signature::from_str(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::ParseError(format!("Invalid signature: {}", e)))?;

        let client = self.client.clone();
        let response = tokio::task::spawn_blocking(move || client.get_signature_statuses(&parsed))
            .await
            .map_err(|e| CoreError::Rpc(format!("Task join error: {}", e)))?
            .map_err(|e| CoreError::Rpc(format!("get_signature_statuses failed: {}", e)))?;

        let commitment = self.commitment;
        Ok(response
            .value
            .into_iter()
            .map(|status| match status {
                None => LedgerStatus::Pending,
                Some(status) => match &status.err {
                    Some(err) => LedgerStatus::Failed(failure_reason(err)),
                    None if status.satisfies_commitment(commitment) => LedgerStatus::Confirmed,
                    None => LedgerStatus::Pending,
                },
            })
            .collect())
    }
}

/// Custom program error number carried by a failed instruction, if any.
pub fn custom_error_code(err: &TransactionError) -> Option<u32> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

fn failure_reason(err: &TransactionError) -> FailureReason {
    FailureReason {
        code: custom_error_code(err),
        message: err.to_string(),
    }
}

fn submission_failure(err: &ClientError) -> SubmissionFailure {
    let message = err.to_string();
    match err.get_transaction_error().as_ref().and_then(custom_error_code) {
        Some(code) => SubmissionFailure::with_code(code, message),
        None => SubmissionFailure::new(message),
    }
}
