// Native implementations

pub mod rpc_impl;
pub mod transaction_signer;

pub use rpc_impl::NativeLedgerClient;
pub use transaction_signer::KeypairWalletSigner;
