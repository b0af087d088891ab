use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::fmt;
use std::time::Duration;

/// Items issued per mint. The page only ever mints one at a time.
pub const MINT_QUANTITY: u8 = 1;

/// A single user-initiated mint. Ephemeral: one per click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    payer: Pubkey,
    timeout_ms: u64,
}

impl MintRequest {
    pub fn new(payer: Pubkey, timeout_ms: u64) -> CoreResult<Self> {
        if timeout_ms == 0 {
            return Err(CoreError::Validation(
                "mint timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(Self { payer, timeout_ms })
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn quantity(&self) -> u8 {
        MINT_QUANTITY
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Serialized (bincode) transaction waiting for the wallet's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction(pub Vec<u8>);

/// Serialized (bincode) transaction carrying the payer's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction(pub Vec<u8>);

impl UnsignedTransaction {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl SignedTransaction {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A transaction the ledger has accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
    pub signature: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedTransaction {
    pub fn new(signature: String) -> Self {
        Self {
            signature,
            submitted_at: Utc::now(),
        }
    }
}

/// Why the ledger refused a transaction, as reported by the ledger.
///
/// `code` is the program's custom error number when the failure came from
/// program logic; `message` is the raw ledger text and is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub code: Option<u32>,
    pub message: String,
}

impl FailureReason {
    pub fn program(code: u32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {:#x})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// One observation of a signature on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStatus {
    Pending,
    Confirmed,
    Failed(FailureReason),
}

/// Terminal result of polling a submitted signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationOutcome {
    Confirmed,
    Failed(FailureReason),
    TimedOut,
}

impl fmt::Display for ConfirmationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationOutcome::Confirmed => write!(f, "confirmed"),
            ConfirmationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
            ConfirmationOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The user dismissed the signature prompt.
    Declined,
    /// No wallet connected, or the wallet cannot sign.
    NotReady,
}

/// User-facing result of one mint attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintOutcome {
    Success,
    SoldOut,
    NotStarted,
    InsufficientFunds,
    UserRejected(RejectReason),
    NetworkTimeout,
    UnknownError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// What the page shows after an attempt settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
}

impl MintOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MintOutcome::Success)
    }

    /// The page used to reload itself on this outcome; whether to keep doing
    /// that is up to the presentation layer.
    pub fn is_sold_out(&self) -> bool {
        matches!(self, MintOutcome::SoldOut)
    }

    pub fn alert(&self) -> Alert {
        let (message, severity) = match self {
            MintOutcome::Success => ("Congratulations! Mint succeeded!".to_string(), Severity::Success),
            MintOutcome::SoldOut => ("SOLD OUT!".to_string(), Severity::Error),
            MintOutcome::NotStarted => ("Minting period hasn't started yet.".to_string(), Severity::Error),
            MintOutcome::InsufficientFunds => (
                "Insufficient funds to mint. Please fund your wallet.".to_string(),
                Severity::Error,
            ),
            MintOutcome::UserRejected(RejectReason::Declined) => (
                "Transaction was not approved in your wallet.".to_string(),
                Severity::Error,
            ),
            MintOutcome::UserRejected(RejectReason::NotReady) => (
                "Connect a wallet that can sign transactions to mint.".to_string(),
                Severity::Error,
            ),
            MintOutcome::NetworkTimeout => ("Transaction Timeout! Please try again.".to_string(), Severity::Error),
            MintOutcome::UnknownError(msg) if msg.trim().is_empty() => {
                ("Minting failed! Please try again!".to_string(), Severity::Error)
            }
            MintOutcome::UnknownError(msg) => (format!("Minting failed! {}", msg), Severity::Error),
        };
        Alert { message, severity }
    }
}

impl fmt::Display for MintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alert().message)
    }
}

/// Where a controller is in its mint cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    InFlight(MintRequest),
    Settled(MintOutcome),
}

impl LifecycleState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, LifecycleState::InFlight(_))
    }

    pub fn outcome(&self) -> Option<&MintOutcome> {
        match self {
            LifecycleState::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_zero_timeout() {
        let payer = Pubkey::new_unique();
        assert!(MintRequest::new(payer, 0).is_err());

        let req = MintRequest::new(payer, 5_000).unwrap();
        assert_eq!(req.quantity(), 1);
        assert_eq!(req.timeout(), Duration::from_secs(5));
        assert_eq!(req.payer(), &payer);
    }

    #[test]
    fn test_alert_messages() {
        assert_eq!(MintOutcome::Success.alert().severity, Severity::Success);
        assert_eq!(MintOutcome::SoldOut.alert().message, "SOLD OUT!");
        assert_eq!(
            MintOutcome::NetworkTimeout.alert().message,
            "Transaction Timeout! Please try again."
        );
        assert_eq!(
            MintOutcome::UnknownError(String::new()).alert().message,
            "Minting failed! Please try again!"
        );
        assert_ne!(
            MintOutcome::UserRejected(RejectReason::Declined).alert(),
            MintOutcome::UserRejected(RejectReason::NotReady).alert()
        );
    }

    #[test]
    fn test_lifecycle_outcome_only_when_settled() {
        let req = MintRequest::new(Pubkey::new_unique(), 1_000).unwrap();
        assert_eq!(LifecycleState::Idle.outcome(), None);
        assert_eq!(LifecycleState::InFlight(req.clone()).outcome(), None);
        assert!(LifecycleState::InFlight(req).is_in_flight());
        assert_eq!(
            LifecycleState::Settled(MintOutcome::SoldOut).outcome(),
            Some(&MintOutcome::SoldOut)
        );
    }

    #[test]
    fn test_failure_reason_display() {
        let reason = FailureReason::program(0x137, "custom program error");
        assert_eq!(reason.to_string(), "custom program error (code 0x137)");
        assert_eq!(FailureReason::other("blockhash not found").to_string(), "blockhash not found");
    }
}
