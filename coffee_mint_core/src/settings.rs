use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use solana_program::instruction::AccountMeta;
use solana_program::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable prefix for overrides, e.g. `COFFEE_MINT_RPC_URL`.
pub const ENV_PREFIX: &str = "COFFEE_MINT";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_tx_timeout_ms")]
    pub tx_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub mint_program_id: String,
    /// Base58-encoded instruction data for the mint instruction
    #[serde(default)]
    pub mint_instruction_data: String,
    /// Accounts appended after the payer, in instruction order
    #[serde(default)]
    pub mint_accounts: Vec<MintAccount>,
    #[serde(default)]
    pub wallet_keypair_path: Option<String>,
    #[serde(default)]
    pub wallet_private_key_string: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MintAccount {
    pub pubkey: String,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default)]
    pub is_writable: bool,
}

impl MintAccount {
    pub fn to_account_meta(&self) -> Result<AccountMeta, CoreError> {
        let pubkey = Pubkey::from_str(&self.pubkey)
            .map_err(|e| CoreError::Validation(format!("Invalid mint account {}: {}", self.pubkey, e)))?;
        Ok(AccountMeta {
            pubkey,
            is_signer: self.is_signer,
            is_writable: self.is_writable,
        })
    }
}

impl Settings {
    /// Load from a TOML file, then apply `COFFEE_MINT_*` environment overrides.
    #[cfg(feature = "native")]
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn to_toml(&self) -> Result<String, CoreError> {
        Ok(toml::to_string(self)?)
    }

    /// Copy with secrets blanked, for display.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        if copy.wallet_private_key_string.is_some() {
            copy.wallet_private_key_string = Some("<redacted>".to_string());
        }
        copy
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn program_id(&self) -> Result<Pubkey, CoreError> {
        Pubkey::from_str(&self.mint_program_id)
            .map_err(|e| CoreError::Validation(format!("Invalid mint_program_id: {}", e)))
    }

    pub fn instruction_data(&self) -> Result<Vec<u8>, CoreError> {
        bs58::decode(self.mint_instruction_data.trim())
            .into_vec()
            .map_err(|e| CoreError::Validation(format!("Invalid mint_instruction_data: {}", e)))
    }

    pub fn account_metas(&self) -> Result<Vec<AccountMeta>, CoreError> {
        self.mint_accounts.iter().map(MintAccount::to_account_meta).collect()
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.rpc_url.trim().is_empty() {
            return Err(CoreError::Validation("rpc_url must be set".to_string()));
        }
        if !matches!(self.commitment.as_str(), "processed" | "confirmed" | "finalized") {
            return Err(CoreError::Validation(format!(
                "commitment must be processed, confirmed or finalized (got {})",
                self.commitment
            )));
        }
        if self.tx_timeout_ms == 0 {
            return Err(CoreError::Validation("tx_timeout_ms must be > 0".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Validation("poll_interval_ms must be > 0".to_string()));
        }
        if self.poll_interval_ms >= self.tx_timeout_ms {
            return Err(CoreError::Validation(
                "poll_interval_ms must be smaller than tx_timeout_ms".to_string(),
            ));
        }
        self.program_id()?;
        self.instruction_data()?;
        self.account_metas()?;
        Ok(())
    }
}

/// Parse a private key string in various formats:
/// - Base58 (standard Solana format, 88 chars)
/// - JSON array string like "[1,2,3,...]"
/// - Comma-separated bytes like "1,2,3,..."
pub fn parse_private_key_string(s: &str) -> Result<Vec<u8>, CoreError> {
    let trimmed = s.trim();

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str::<Vec<u8>>(trimmed)?);
    }

    if trimmed.contains(',') {
        return trimmed
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| CoreError::InvalidKeypair(format!("CSV parse failed: {}", e)));
    }

    if trimmed.len() >= 80 {
        return bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| CoreError::InvalidKeypair(format!("Base58 decode failed: {}", e)));
    }

    Err(CoreError::InvalidKeypair(
        "Unrecognized private key format. Expected: base58, JSON array, or comma-separated bytes".to_string(),
    ))
}

fn default_commitment() -> String { "confirmed".to_string() }
fn default_tx_timeout_ms() -> u64 { 30_000 }
fn default_poll_interval_ms() -> u64 { 500 }
