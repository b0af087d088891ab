// Bounded polling of a submitted signature until it reaches a terminal status

use crate::error::CoreError;
use crate::models::{ConfirmationOutcome, FailureReason, LedgerStatus};
use crate::rpc_client::LedgerClient;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Polls a ledger at a fixed interval until the signature is confirmed,
/// fails on-chain, or the caller's time budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPoller {
    interval: Duration,
}

impl Default for ConfirmationPoller {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl ConfirmationPoller {
    /// A zero interval is bumped to 1ms so polling always yields.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `signature` until a terminal status or until `timeout` has
    /// elapsed, whichever comes first.
    ///
    /// The first query is issued immediately. A terminal status seen in the
    /// same round the budget runs out still wins over `TimedOut`. Failure
    /// reasons are passed through untouched. RPC errors on a status query
    /// are treated as "still pending" and retried on the next round; any
    /// other error (e.g. an unparsable signature) ends polling as `Failed`.
    pub async fn confirm<L: LedgerClient + ?Sized>(
        &self,
        signature: &str,
        timeout: Duration,
        ledger: &L,
    ) -> ConfirmationOutcome {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match ledger.get_status(signature).await {
                Ok(LedgerStatus::Confirmed) => {
                    info!("Transaction {} confirmed after {} status checks", signature, attempts);
                    return ConfirmationOutcome::Confirmed;
                }
                Ok(LedgerStatus::Failed(reason)) => {
                    warn!("Transaction {} failed on-chain: {}", signature, reason);
                    return ConfirmationOutcome::Failed(reason);
                }
                Ok(LedgerStatus::Pending) => {
                    debug!("Transaction {} pending (check {})", signature, attempts);
                }
                Err(CoreError::Rpc(e)) => {
                    warn!("Status check {} failed for {}: {}", attempts, signature, e);
                }
                Err(e) => {
                    warn!("Giving up on {}: {}", signature, e);
                    return ConfirmationOutcome::Failed(FailureReason::other(e.to_string()));
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                warn!(
                    "Transaction confirmation timeout after {}ms ({} checks): {}",
                    elapsed.as_millis(),
                    attempts,
                    signature
                );
                return ConfirmationOutcome::TimedOut;
            }

            sleep(self.interval.min(timeout - elapsed)).await;
        }
    }
}

/// Confirm with the default poll interval.
pub async fn confirm<L: LedgerClient + ?Sized>(
    signature: &str,
    timeout: Duration,
    ledger: &L,
) -> ConfirmationOutcome {
    ConfirmationPoller::default()
        .confirm(signature, timeout, ledger)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SOLD_OUT_CODE;
    use crate::testing::ScriptedLedger;

    fn poller() -> ConfirmationPoller {
        ConfirmationPoller::new(Duration::from_millis(500))
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_pending_rounds() {
        let ledger = ScriptedLedger::pending_then(4, LedgerStatus::Confirmed);
        let outcome = poller()
            .confirm("sig", Duration::from_millis(500 * 5), &ledger)
            .await;

        assert_eq!(outcome, ConfirmationOutcome::Confirmed);
        assert_eq!(ledger.status_queries.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_before_confirmation() {
        let ledger = ScriptedLedger::pending_then(6, LedgerStatus::Confirmed);
        let started = Instant::now();
        let outcome = poller()
            .confirm("sig", Duration::from_millis(2_400), &ledger)
            .await;

        assert_eq!(outcome, ConfirmationOutcome::TimedOut);
        assert_eq!(ledger.status_queries.get(), 6);
        assert!(started.elapsed() >= Duration::from_millis(2_400));
        assert!(started.elapsed() < Duration::from_millis(2_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sold_out_failure_passes_through() {
        for timeout_ms in [1, 500, 60_000] {
            let reason = FailureReason::program(SOLD_OUT_CODE, "custom program error: 0x137");
            let ledger = ScriptedLedger::new(vec![LedgerStatus::Failed(reason.clone())], LedgerStatus::Pending);
            let outcome = poller()
                .confirm("sig", Duration::from_millis(timeout_ms), &ledger)
                .await;

            assert_eq!(outcome, ConfirmationOutcome::Failed(reason));
            assert_eq!(ledger.status_queries.get(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_wins_on_last_round() {
        // Third check lands exactly on the budget.
        let ledger = ScriptedLedger::pending_then(2, LedgerStatus::Confirmed);
        let outcome = poller()
            .confirm("sig", Duration::from_millis(1_000), &ledger)
            .await;

        assert_eq!(outcome, ConfirmationOutcome::Confirmed);
        assert_eq!(ledger.status_queries.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_errors_count_as_pending() {
        let ledger = ScriptedLedger::pending_then(1, LedgerStatus::Confirmed);
        ledger.push_rpc_error("429 Too Many Requests");

        let outcome = poller()
            .confirm("sig", Duration::from_secs(10), &ledger)
            .await;

        assert_eq!(outcome, ConfirmationOutcome::Confirmed);
        assert_eq!(ledger.status_queries.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_never_overshoots_budget() {
        let ledger = ScriptedLedger::never_resolves();
        let started = Instant::now();
        let outcome = ConfirmationPoller::new(Duration::from_secs(3))
            .confirm("sig", Duration::from_millis(1_000), &ledger)
            .await;

        assert_eq!(outcome, ConfirmationOutcome::TimedOut);
        assert_eq!(ledger.status_queries.get(), 2);
        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert!(started.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparsable_signature_fails_without_retrying() {
        let ledger = ScriptedLedger::never_resolves();
        ledger.push_error(CoreError::ParseError("Invalid signature: not-a-signature".to_string()));
        let started = Instant::now();

        let outcome = poller()
            .confirm("not-a-signature", Duration::from_secs(30), &ledger)
            .await;

        match outcome {
            ConfirmationOutcome::Failed(reason) => {
                assert_eq!(reason.code, None);
                assert!(reason.message.contains("not-a-signature"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(ledger.status_queries.get(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_confirm_uses_default_interval() {
        let ledger = ScriptedLedger::pending_then(2, LedgerStatus::Confirmed);
        let started = Instant::now();

        let outcome = confirm("sig", Duration::from_secs(5), &ledger).await;

        assert_eq!(outcome, ConfirmationOutcome::Confirmed);
        assert_eq!(ledger.status_queries.get(), 3);
        assert!(started.elapsed() >= Duration::from_millis(2 * DEFAULT_POLL_INTERVAL_MS));
        assert!(started.elapsed() < Duration::from_millis(3 * DEFAULT_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_interval_defaults_and_clamps() {
        assert_eq!(
            ConfirmationPoller::default().interval(),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
        assert_eq!(ConfirmationPoller::new(Duration::ZERO).interval(), Duration::from_millis(1));
    }
}
