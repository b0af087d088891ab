// Wallet signing abstraction
// Implementations may suspend while a user answers a signing prompt

use crate::models::{SignedTransaction, UnsignedTransaction};
use async_trait::async_trait;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

/// Why the wallet produced no signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningFailure {
    /// The user dismissed or declined the signing prompt.
    #[error("signature request rejected by user")]
    Rejected,
    /// No wallet connected, or it lacks signing capability.
    #[error("wallet not connected or unable to sign")]
    Unavailable,
    /// The wallet could not interpret or sign the transaction bytes.
    #[error("wallet could not sign transaction: {0}")]
    Malformed(String),
}

pub type SignerResult<T> = Result<T, SigningFailure>;

#[async_trait(?Send)]
pub trait WalletSigner {
    /// Public key of the connected account, if any
    fn public_key(&self) -> Option<Pubkey>;

    /// Whether the wallet is connected and able to sign right now
    async fn is_ready(&self) -> bool;

    /// Sign one transaction. May suspend until the user answers the prompt.
    async fn sign_transaction(&self, transaction: &UnsignedTransaction) -> SignerResult<SignedTransaction>;

    /// Sign several transactions behind one prompt. Wallets without batch
    /// support sign them one by one.
    async fn sign_all_transactions(
        &self,
        transactions: &[UnsignedTransaction],
    ) -> SignerResult<Vec<SignedTransaction>> {
        let mut signed = Vec::with_capacity(transactions.len());
        for tx in transactions {
            signed.push(self.sign_transaction(tx).await?);
        }
        Ok(signed)
    }
}
