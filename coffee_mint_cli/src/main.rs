mod commands;
mod error;

use chrono::{DateTime, Utc};
use clap::Parser;
use coffee_mint_core::{
    classify,
    native::{KeypairWalletSigner, NativeLedgerClient},
    Alert, ConfirmationOutcome, ConfirmationPoller, InstructionMintRequester, MintContext, MintController,
    MintOutcome, MintRequest, Settings, Settlement, Severity, WalletSigner,
};
use colored::Colorize;
use commands::{Cli, Commands, ConfigCommands};
use error::AppError;
use log::{debug, info};
use serde::Serialize;
use solana_sdk::signature::Signature;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

#[derive(Serialize)]
struct MintReport {
    outcome: MintOutcome,
    alert: Alert,
    signature: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct StatusReport {
    signature: String,
    confirmation: ConfirmationOutcome,
    alert: Alert,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match handle_command(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {}", "ERROR:".red(), error);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded from the user's point of view.
async fn handle_command(cli: &Cli) -> Result<bool, AppError> {
    match &cli.command {
        Commands::Mint { timeout_ms } => run_mint(cli, *timeout_ms).await,
        Commands::Status { signature, timeout_ms } => run_status(cli, signature, *timeout_ms).await,
        Commands::Config { command } => handle_config_command(cli, command),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, AppError> {
    let path = cli
        .config
        .to_str()
        .ok_or_else(|| AppError::Config(format!("Config path is not UTF-8: {}", cli.config.display())))?;
    debug!("Loading config from {}", path);
    let settings = Settings::from_file(path)?;
    settings.validate()?;
    Ok(settings)
}

async fn run_mint(cli: &Cli, timeout_ms: Option<u64>) -> Result<bool, AppError> {
    let settings = load_settings(cli)?;
    let ledger = NativeLedgerClient::from_settings(&settings)?;
    let wallet = KeypairWalletSigner::from_settings(&settings)?;
    let requester = InstructionMintRequester::from_settings(&ledger, &settings)?;

    let payer = wallet
        .public_key()
        .ok_or_else(|| AppError::Config("Wallet has no public key".to_string()))?;
    let request = MintRequest::new(payer, timeout_ms.unwrap_or(settings.tx_timeout_ms))?;
    info!("Minting for {} (timeout {}ms)", payer, request.timeout_ms());

    let controller = MintController::new(ConfirmationPoller::new(settings.poll_interval()));
    let ctx = MintContext {
        ledger: &ledger,
        wallet: &wallet,
        requester: &requester,
    };
    let receipt = controller.mint_with_receipt(&ctx, request).await?;

    let alert = receipt.outcome.alert();
    if cli.json {
        let report = MintReport {
            outcome: receipt.outcome.clone(),
            alert,
            signature: receipt.submission.as_ref().map(|s| s.signature.clone()),
            submitted_at: receipt.submission.as_ref().map(|s| s.submitted_at),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_alert(&alert);
        if let Some(submission) = &receipt.submission {
            println!("Signature: {}", submission.signature);
            if receipt.outcome == MintOutcome::NetworkTimeout {
                println!(
                    "{}",
                    format!(
                        "The transaction may still land. Check it with: coffee_mint status {}",
                        submission.signature
                    )
                    .yellow()
                );
            }
        }
    }

    Ok(receipt.outcome.is_success())
}

fn parse_signature(signature: &str) -> Result<Signature, AppError> {
    Signature::from_str(signature.trim())
        .map_err(|e| AppError::InvalidSignature(signature.to_string(), e.to_string()))
}

async fn run_status(cli: &Cli, signature: &str, timeout_ms: Option<u64>) -> Result<bool, AppError> {
    let signature = parse_signature(signature)?.to_string();
    let settings = load_settings(cli)?;
    let ledger = NativeLedgerClient::from_settings(&settings)?;
    let timeout = timeout_ms.map(Duration::from_millis).unwrap_or_else(|| settings.tx_timeout());

    let confirmation = ConfirmationPoller::new(settings.poll_interval())
        .confirm(&signature, timeout, &ledger)
        .await;
    let alert = classify(&Settlement::Confirmation(confirmation.clone())).alert();

    if cli.json {
        let report = StatusReport {
            signature: signature.clone(),
            confirmation: confirmation.clone(),
            alert,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}: {}", signature, confirmation);
        print_alert(&alert);
    }

    Ok(confirmation == ConfirmationOutcome::Confirmed)
}

fn handle_config_command(cli: &Cli, command: &ConfigCommands) -> Result<bool, AppError> {
    let settings = load_settings(cli)?;
    match command {
        ConfigCommands::Validate => {
            println!("{} {}", "OK:".green(), cli.config.display());
        }
        ConfigCommands::Show => {
            print!("{}", settings.redacted().to_toml()?);
        }
    }
    Ok(true)
}

fn print_alert(alert: &Alert) {
    match alert.severity {
        Severity::Success => println!("{}", alert.message.green().bold()),
        Severity::Error => println!("{}", alert.message.red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signature_rejects_garbage() {
        let err = parse_signature("not-a-signature").unwrap_err();
        assert!(matches!(err, AppError::InvalidSignature(ref s, _) if s == "not-a-signature"));
        assert!(parse_signature("").is_err());
    }

    #[test]
    fn test_parse_signature_accepts_base58() {
        let signature = Signature::from([7u8; 64]);
        let parsed = parse_signature(&format!(" {} ", signature)).unwrap();
        assert_eq!(parsed, signature);
    }
}
