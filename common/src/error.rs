use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Every way the runner can fail. All variants abort the run the same way.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no signing identity available from the network client")]
    NoSigner,

    #[error("failed to resolve signer: {0}")]
    Signer(String),

    #[error("failed to attach to contract at {address}: {reason}")]
    Attach { address: Address, reason: String },

    #[error("{method} submission failed: {reason}")]
    Submit { method: &'static str, reason: String },

    #[error("{method} confirmation failed: {reason}")]
    Confirm { method: &'static str, reason: String },

    #[error("{method} reverted in transaction {tx_hash}")]
    Reverted { method: &'static str, tx_hash: TxHash },
}

pub type Result<T> = std::result::Result<T, FlowError>;
