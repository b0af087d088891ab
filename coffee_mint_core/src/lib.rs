// Coffee Punks mint core
// Mint lifecycle on tokio: build, sign, submit, confirm, classify

pub mod models;
pub mod error;
pub mod settings;
pub mod rpc_client;
pub mod transaction_signer;
pub mod mint_requester;
pub mod confirmation;
pub mod classifier;
pub mod controller;

#[cfg(feature = "native")]
pub mod native;

#[cfg(test)]
mod testing;

// Re-exports
pub use error::{ControllerError, CoreError, CoreResult};
pub use models::*;
pub use settings::Settings;
pub use rpc_client::*;
pub use transaction_signer::*;
pub use mint_requester::*;
pub use confirmation::{confirm, ConfirmationPoller, DEFAULT_POLL_INTERVAL_MS};
pub use classifier::{classify, Settlement};
pub use controller::*;
