// ─────────────────── Network client boundary ───────────────────
//
// The runner only talks to these traits. `evm` provides the alloy-backed
// implementation; tests provide recording mocks.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// One state-changing `Mock1155s` call with its ordered arguments. The
/// target is the handle it is submitted through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    NewId {
        fungible: bool,
        uri_a: String,
        uri_b: String,
    },
    Mint {
        to: Address,
        id: U256,
        amount: U256,
        data: Bytes,
    },
}

impl TokenCall {
    pub fn method(&self) -> &'static str {
        match self {
            TokenCall::NewId { .. } => "newId",
            TokenCall::Mint { .. } => "mint",
        }
    }
}

/// What was observed once a submitted call got mined.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub method: &'static str,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

#[async_trait]
pub trait NetworkClient: Send + Sync {
    type Contract: TokenContract;

    /// First signing identity the client can use.
    async fn first_signer(&self) -> Result<Address>;

    /// Typed `Mock1155s` handle at `address`, sending as `from`.
    async fn attach(&self, address: Address, from: Address) -> Result<Self::Contract>;
}

#[async_trait]
pub trait TokenContract: Send + Sync {
    type Pending: PendingCall;

    fn address(&self) -> Address;

    /// Submit one call. Returns once the node accepted the transaction,
    /// not once it is mined.
    async fn submit(&self, call: &TokenCall) -> Result<Self::Pending>;
}

#[async_trait]
pub trait PendingCall: Send {
    fn tx_hash(&self) -> TxHash;

    async fn confirm(self) -> Result<Confirmation>;
}
