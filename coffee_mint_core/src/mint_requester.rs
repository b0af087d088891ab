// Builds the program-specific mint transaction for a payer

use crate::error::CoreError;
use crate::models::UnsignedTransaction;
use crate::rpc_client::LedgerClient;
use crate::settings::Settings;
use async_trait::async_trait;
use log::debug;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;

pub type RequesterResult<T> = Result<T, CoreError>;

#[async_trait(?Send)]
pub trait MintRequester {
    /// Produce an unsigned transaction minting one item to `payer`.
    async fn build(&self, payer: &Pubkey) -> RequesterResult<UnsignedTransaction>;
}

/// Requester for a single configured instruction. The payer is always the
/// first account (signer, writable); configured accounts follow in order.
///
/// Knows nothing about the program's account layout; the accounts and
/// instruction data come from settings.
pub struct InstructionMintRequester<'a> {
    ledger: &'a dyn LedgerClient,
    program_id: Pubkey,
    data: Vec<u8>,
    accounts: Vec<AccountMeta>,
}

impl<'a> InstructionMintRequester<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, program_id: Pubkey, data: Vec<u8>, accounts: Vec<AccountMeta>) -> Self {
        Self {
            ledger,
            program_id,
            data,
            accounts,
        }
    }

    pub fn from_settings(ledger: &'a dyn LedgerClient, settings: &Settings) -> RequesterResult<Self> {
        Ok(Self::new(
            ledger,
            settings.program_id()?,
            settings.instruction_data()?,
            settings.account_metas()?,
        ))
    }

    pub fn instruction(&self, payer: &Pubkey) -> Instruction {
        let mut accounts = Vec::with_capacity(self.accounts.len() + 1);
        accounts.push(AccountMeta::new(*payer, true));
        accounts.extend(self.accounts.iter().cloned());
        Instruction {
            program_id: self.program_id,
            accounts,
            data: self.data.clone(),
        }
    }
}

#[async_trait(?Send)]
impl MintRequester for InstructionMintRequester<'_> {
    async fn build(&self, payer: &Pubkey) -> RequesterResult<UnsignedTransaction> {
        let blockhash = self.ledger.get_latest_blockhash().await?;
        let blockhash = Hash::from_str(&blockhash)
            .map_err(|e| CoreError::ParseError(format!("Invalid blockhash {}: {}", blockhash, e)))?;

        let message = Message::new_with_blockhash(&[self.instruction(payer)], Some(payer), &blockhash);
        let tx = Transaction::new_unsigned(message);
        debug!(
            "Built mint transaction for {} against program {} ({} accounts)",
            payer,
            self.program_id,
            self.accounts.len() + 1
        );
        Ok(UnsignedTransaction(bincode::serialize(&tx)?))
    }
}
