// Mint lifecycle controller: request -> sign -> submit -> confirm -> classify
//
// A controller runs at most one mint at a time. Collaborators are handed in
// per call through `MintContext`; the controller itself only owns its
// lifecycle state and its polling configuration.
//
// Known consistency gap: a transaction cannot be recalled once the ledger
// has accepted it. `NetworkTimeout` means the controller stopped waiting,
// not that the mint was cancelled, and the item may still land on-chain
// afterwards. The same holds when a caller drops an in-flight `mint()`
// future. `MintReceipt::submission` carries the signature so the caller can
// look it up later.

use crate::classifier::{classify, Settlement};
use crate::confirmation::ConfirmationPoller;
use crate::error::ControllerError;
use crate::mint_requester::MintRequester;
use crate::models::{ConfirmationOutcome, LifecycleState, MintOutcome, MintRequest, SubmittedTransaction};
use crate::rpc_client::LedgerClient;
use crate::transaction_signer::{SigningFailure, WalletSigner};
use log::{debug, info, warn};
use tokio::sync::watch;

/// Collaborators for one mint call. Shared and read-only for its duration.
#[derive(Clone, Copy)]
pub struct MintContext<'a> {
    pub ledger: &'a dyn LedgerClient,
    pub wallet: &'a dyn WalletSigner,
    pub requester: &'a dyn MintRequester,
}

/// Outcome of one attempt plus the transaction it submitted, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub outcome: MintOutcome,
    pub submission: Option<SubmittedTransaction>,
}

pub struct MintController {
    state: watch::Sender<LifecycleState>,
    poller: ConfirmationPoller,
}

impl Default for MintController {
    fn default() -> Self {
        Self::new(ConfirmationPoller::default())
    }
}

impl MintController {
    pub fn new(poller: ConfirmationPoller) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self { state, poller }
    }

    /// Snapshot of the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Watch lifecycle transitions, e.g. to disable a mint button while a
    /// mint is in flight.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Mint one item. Fails fast with `MintInFlight` if another mint on this
    /// controller has not settled yet; nothing is built, signed or sent in
    /// that case.
    pub async fn mint(&self, ctx: &MintContext<'_>, request: MintRequest) -> Result<MintOutcome, ControllerError> {
        self.mint_with_receipt(ctx, request)
            .await
            .map(|receipt| receipt.outcome)
    }

    pub async fn mint_with_receipt(
        &self,
        ctx: &MintContext<'_>,
        request: MintRequest,
    ) -> Result<MintReceipt, ControllerError> {
        self.begin(&request)?;
        let guard = InFlightGuard {
            state: &self.state,
            settled: false,
        };

        let (settlement, submission) = self.run(ctx, &request).await;
        let outcome = classify(&settlement);
        info!("Mint for {} settled: {:?}", request.payer(), outcome);

        guard.settle(outcome.clone());
        Ok(MintReceipt { outcome, submission })
    }

    /// Clear a settled outcome back to Idle, e.g. once the UI has shown the
    /// alert. Does nothing while a mint is in flight. Returns whether the
    /// state changed.
    pub fn reset(&self) -> bool {
        self.state.send_if_modified(|state| {
            if !matches!(state, LifecycleState::Settled(_)) {
                return false;
            }
            *state = LifecycleState::Idle;
            true
        })
    }

    /// Publishes Idle for a settled controller, then claims InFlight. Watch
    /// receivers only keep the latest value, so a slow watcher may go from
    /// Settled straight to InFlight.
    fn begin(&self, request: &MintRequest) -> Result<(), ControllerError> {
        self.reset();
        let claimed = self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            *state = LifecycleState::InFlight(request.clone());
            true
        });

        if !claimed {
            warn!("Rejected mint for {}: another mint is in flight", request.payer());
            return Err(ControllerError::MintInFlight);
        }
        debug!("Mint for {} in flight", request.payer());
        Ok(())
    }

    async fn run(
        &self,
        ctx: &MintContext<'_>,
        request: &MintRequest,
    ) -> (Settlement, Option<SubmittedTransaction>) {
        if ctx.wallet.public_key().is_none() || !ctx.wallet.is_ready().await {
            warn!("Wallet not ready; refusing to mint");
            return (Settlement::Signing(SigningFailure::Unavailable), None);
        }

        let unsigned = match ctx.requester.build(request.payer()).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!("Failed to build mint transaction: {}", e);
                return (Settlement::Request(e.to_string()), None);
            }
        };

        let signed = match ctx.wallet.sign_transaction(&unsigned).await {
            Ok(tx) => tx,
            Err(failure) => {
                info!("Wallet did not sign mint transaction: {}", failure);
                return (Settlement::Signing(failure), None);
            }
        };

        let submitted = match ctx.ledger.submit(&signed).await {
            Ok(signature) => SubmittedTransaction::new(signature),
            Err(failure) => {
                warn!("Mint transaction submission failed: {}", failure);
                return (Settlement::Submission(failure), None);
            }
        };
        info!("Mint transaction submitted: {}", submitted.signature);

        let confirmation = self
            .poller
            .confirm(&submitted.signature, request.timeout(), ctx.ledger)
            .await;
        if confirmation == ConfirmationOutcome::TimedOut {
            warn!(
                "Stopped waiting for {}; it may still land on-chain",
                submitted.signature
            );
        }

        (Settlement::Confirmation(confirmation), Some(submitted))
    }
}

/// Puts the controller back to Idle if a mint future is dropped before it
/// settles, so the controller stays usable.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<LifecycleState>,
    settled: bool,
}

impl InFlightGuard<'_> {
    fn settle(mut self, outcome: MintOutcome) {
        self.state.send_replace(LifecycleState::Settled(outcome));
        self.settled = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Mint abandoned before settling; controller reset to idle");
            self.state.send_replace(LifecycleState::Idle);
        }
    }
}
