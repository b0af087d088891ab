// Scripted collaborators for unit tests

use crate::error::CoreError;
use crate::mint_requester::{MintRequester, RequesterResult};
use crate::models::{LedgerStatus, SignedTransaction, UnsignedTransaction};
use crate::rpc_client::{LedgerClient, RpcResult, SubmissionFailure};
use crate::transaction_signer::{SignerResult, SigningFailure, WalletSigner};
use async_trait::async_trait;
use solana_program::pubkey::Pubkey;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::Notify;

/// Ledger that replays a status script and counts every call.
///
/// Once the script runs dry every query answers `fallback`.
pub struct ScriptedLedger {
    statuses: RefCell<VecDeque<RpcResult<LedgerStatus>>>,
    fallback: LedgerStatus,
    submit_failure: RefCell<Option<SubmissionFailure>>,
    pub submissions: Cell<usize>,
    pub status_queries: Cell<usize>,
}

impl ScriptedLedger {
    pub fn new(script: Vec<LedgerStatus>, fallback: LedgerStatus) -> Self {
        Self {
            statuses: RefCell::new(script.into_iter().map(Ok).collect()),
            fallback,
            submit_failure: RefCell::new(None),
            submissions: Cell::new(0),
            status_queries: Cell::new(0),
        }
    }

    /// `pending` pending answers followed by `then` forever.
    pub fn pending_then(pending: usize, then: LedgerStatus) -> Self {
        Self::new(vec![LedgerStatus::Pending; pending], then)
    }

    pub fn never_resolves() -> Self {
        Self::new(Vec::new(), LedgerStatus::Pending)
    }

    pub fn push_rpc_error(&self, message: &str) {
        self.push_error(CoreError::Rpc(message.to_string()));
    }

    /// Answer the next status query with `error`.
    pub fn push_error(&self, error: CoreError) {
        self.statuses.borrow_mut().push_front(Err(error));
    }

    pub fn fail_submissions_with(&self, failure: SubmissionFailure) {
        *self.submit_failure.borrow_mut() = Some(failure);
    }
}

#[async_trait(?Send)]
impl LedgerClient for ScriptedLedger {
    async fn get_latest_blockhash(&self) -> RpcResult<String> {
        Ok("11111111111111111111111111111111".to_string())
    }

    async fn submit(&self, _transaction: &SignedTransaction) -> Result<String, SubmissionFailure> {
        let n = self.submissions.get() + 1;
        self.submissions.set(n);
        if let Some(failure) = self.submit_failure.borrow().clone() {
            return Err(failure);
        }
        Ok(format!("sig-{}", n))
    }

    async fn get_signature_statuses(&self, signatures: &[String]) -> RpcResult<Vec<LedgerStatus>> {
        let mut out = Vec::with_capacity(signatures.len());
        for _ in signatures {
            self.status_queries.set(self.status_queries.get() + 1);
            let next = self.statuses.borrow_mut().pop_front();
            out.push(match next {
                Some(status) => status?,
                None => self.fallback.clone(),
            });
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub enum WalletBehaviour {
    Sign,
    Fail(SigningFailure),
}

/// Wallet with a fixed answer. With a gate set, signing waits until the
/// gate is notified, standing in for a user looking at the prompt.
pub struct ScriptedWallet {
    key: Option<Pubkey>,
    ready: bool,
    behaviour: WalletBehaviour,
    gate: Option<Rc<Notify>>,
    pub sign_requests: Cell<usize>,
}

impl ScriptedWallet {
    pub fn signing(key: Pubkey) -> Self {
        Self {
            key: Some(key),
            ready: true,
            behaviour: WalletBehaviour::Sign,
            gate: None,
            sign_requests: Cell::new(0),
        }
    }

    pub fn failing(key: Pubkey, failure: SigningFailure) -> Self {
        Self {
            behaviour: WalletBehaviour::Fail(failure),
            ..Self::signing(key)
        }
    }

    pub fn disconnected() -> Self {
        Self {
            key: None,
            ready: false,
            behaviour: WalletBehaviour::Fail(SigningFailure::Unavailable),
            gate: None,
            sign_requests: Cell::new(0),
        }
    }

    pub fn gated(mut self, gate: Rc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait(?Send)]
impl WalletSigner for ScriptedWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.key
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn sign_transaction(&self, transaction: &UnsignedTransaction) -> SignerResult<SignedTransaction> {
        self.sign_requests.set(self.sign_requests.get() + 1);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.behaviour {
            WalletBehaviour::Sign => Ok(SignedTransaction(transaction.0.clone())),
            WalletBehaviour::Fail(failure) => Err(failure.clone()),
        }
    }
}

/// Requester returning fixed bytes, or failing with an RPC error.
pub struct StaticRequester {
    fail_with: Option<String>,
    pub builds: Cell<usize>,
}

impl StaticRequester {
    pub fn ok() -> Self {
        Self {
            fail_with: None,
            builds: Cell::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            builds: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl MintRequester for StaticRequester {
    async fn build(&self, payer: &Pubkey) -> RequesterResult<UnsignedTransaction> {
        self.builds.set(self.builds.get() + 1);
        match &self.fail_with {
            Some(message) => Err(CoreError::Rpc(message.clone())),
            None => Ok(UnsignedTransaction(payer.to_bytes().to_vec())),
        }
    }
}
