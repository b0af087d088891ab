// Maps raw mint failures to the closed set of user-facing outcomes.
// Pure: no I/O, no logging, every input yields exactly one outcome.

use crate::models::{ConfirmationOutcome, MintOutcome, RejectReason};
use crate::rpc_client::SubmissionFailure;
use crate::transaction_signer::SigningFailure;

/// Candy machine program error: no items left.
pub const SOLD_OUT_CODE: u32 = 0x137;
/// Candy machine program error: go-live date not reached.
pub const NOT_STARTED_CODE: u32 = 0x138;
/// Candy machine program error: payer cannot cover the price.
pub const INSUFFICIENT_FUNDS_CODE: u32 = 0x135;

/// How a mint attempt ended, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The mint requester could not build the transaction.
    Request(String),
    Signing(SigningFailure),
    Submission(SubmissionFailure),
    Confirmation(ConfirmationOutcome),
}

pub fn classify(settlement: &Settlement) -> MintOutcome {
    match settlement {
        Settlement::Request(message) => MintOutcome::UnknownError(message.clone()),
        Settlement::Signing(SigningFailure::Rejected) => MintOutcome::UserRejected(RejectReason::Declined),
        Settlement::Signing(SigningFailure::Unavailable) => MintOutcome::UserRejected(RejectReason::NotReady),
        Settlement::Signing(SigningFailure::Malformed(message)) => MintOutcome::UnknownError(message.clone()),
        Settlement::Submission(failure) => classify_program_error(failure.code, &failure.message),
        Settlement::Confirmation(ConfirmationOutcome::Confirmed) => MintOutcome::Success,
        Settlement::Confirmation(ConfirmationOutcome::TimedOut) => MintOutcome::NetworkTimeout,
        Settlement::Confirmation(ConfirmationOutcome::Failed(reason)) => {
            classify_program_error(reason.code, &reason.message)
        }
    }
}

/// Structured codes decide. Only a failure that carries no code at all is
/// scanned for the hex forms the RPC node prints ("custom program error:
/// 0x137"); an unknown code is never second-guessed from its text.
fn classify_program_error(code: Option<u32>, message: &str) -> MintOutcome {
    let known = match code {
        Some(code) => outcome_for_code(code),
        None => [SOLD_OUT_CODE, NOT_STARTED_CODE, INSUFFICIENT_FUNDS_CODE]
            .into_iter()
            .find(|code| mentions_code(message, *code))
            .and_then(outcome_for_code),
    };
    known.unwrap_or_else(|| MintOutcome::UnknownError(message.to_string()))
}

fn outcome_for_code(code: u32) -> Option<MintOutcome> {
    match code {
        SOLD_OUT_CODE => Some(MintOutcome::SoldOut),
        NOT_STARTED_CODE => Some(MintOutcome::NotStarted),
        INSUFFICIENT_FUNDS_CODE => Some(MintOutcome::InsufficientFunds),
        _ => None,
    }
}

/// True when `message` contains `code` as a standalone `0x..` token.
fn mentions_code(message: &str, code: u32) -> bool {
    let needle = format!("{:#x}", code);
    let haystack = message.to_ascii_lowercase();
    haystack.match_indices(&needle).any(|(at, _)| {
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric());
        let after_ok = haystack[at + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_hexdigit());
        before_ok && after_ok
    })
}
