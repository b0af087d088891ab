// Local keypair wallet

use crate::error::CoreError;
use crate::models::{SignedTransaction, UnsignedTransaction};
use crate::settings::{parse_private_key_string, Settings};
use crate::transaction_signer::{SignerResult, SigningFailure, WalletSigner};
use async_trait::async_trait;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::transaction::Transaction;
use std::path::PathBuf;

pub struct KeypairWalletSigner {
    keypair: Keypair,
}

impl KeypairWalletSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load the keypair from `wallet_private_key_string`, falling back to
    /// `wallet_keypair_path`.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        if let Some(pk_str) = &settings.wallet_private_key_string {
            let bytes = parse_private_key_string(pk_str)?;
            let keypair = Keypair::try_from(bytes.as_slice())
                .map_err(|e| CoreError::InvalidKeypair(e.to_string()))?;
            return Ok(Self::new(keypair));
        }

        if let Some(path) = &settings.wallet_keypair_path {
            let path = expand_home(path);
            let keypair = read_keypair_file(&path)
                .map_err(|e| CoreError::InvalidKeypair(format!("{}: {}", path.display(), e)))?;
            return Ok(Self::new(keypair));
        }

        Err(CoreError::InvalidKeypair(
            "No wallet configured: set wallet_private_key_string or wallet_keypair_path".to_string(),
        ))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

#[async_trait(?Send)]
impl WalletSigner for KeypairWalletSigner {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn is_ready(&self) -> bool {
        true // Native signer is always ready
    }

    async fn sign_transaction(&self, transaction: &UnsignedTransaction) -> SignerResult<SignedTransaction> {
        let mut tx: Transaction = bincode::deserialize(transaction.as_bytes())
            .map_err(|e| SigningFailure::Malformed(format!("Failed to deserialize transaction: {}", e)))?;

        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| SigningFailure::Malformed(e.to_string()))?;

        bincode::serialize(&tx)
            .map(SignedTransaction)
            .map_err(|e| SigningFailure::Malformed(format!("Failed to serialize transaction: {}", e)))
    }
}
