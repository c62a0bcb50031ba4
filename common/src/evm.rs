// ─────────────────── alloy-backed client ───────────────────

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    sol,
};
use async_trait::async_trait;
use tracing::debug;

use crate::client::{Confirmation, NetworkClient, PendingCall, TokenCall, TokenContract};
use crate::error::{FlowError, Result};
use crate::Config;

sol! {
    #[sol(rpc)]
    contract Mock1155s {
        function newId(bool fungible, string calldata uriA, string calldata uriB) external returns (uint256);
        function mint(address to, uint256 id, uint256 amount, bytes calldata data) external;
    }
}

/// JSON-RPC client. Signs locally when a private key is configured,
/// otherwise lets the node sign with its first unlocked account.
pub struct EvmClient {
    provider: DynProvider,
    local_signer: Option<Address>,
    confirmations: u64,
}

impl EvmClient {
    pub fn connect(cfg: &Config) -> Self {
        let url = cfg.rpc_url.clone();
        let (provider, local_signer) = match cfg.signer.clone() {
            Some(signer) => {
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };
        debug!(rpc_url = %cfg.rpc_url, local = local_signer.is_some(), "rpc client ready");
        Self::with_provider(provider, local_signer, cfg.confirmations)
    }

    pub fn with_provider(provider: DynProvider, local_signer: Option<Address>, confirmations: u64) -> Self {
        Self {
            provider,
            local_signer,
            confirmations,
        }
    }
}

#[async_trait]
impl NetworkClient for EvmClient {
    type Contract = EvmContract;

    async fn first_signer(&self) -> Result<Address> {
        if let Some(address) = self.local_signer {
            return Ok(address);
        }
        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| FlowError::Signer(e.to_string()))?;
        accounts.first().copied().ok_or(FlowError::NoSigner)
    }

    async fn attach(&self, address: Address, from: Address) -> Result<EvmContract> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| FlowError::Attach {
                address,
                reason: e.to_string(),
            })?;
        if code.is_empty() {
            return Err(FlowError::Attach {
                address,
                reason: "no contract code deployed".into(),
            });
        }
        Ok(EvmContract {
            instance: Mock1155s::new(address, self.provider.clone()),
            from,
            confirmations: self.confirmations,
        })
    }
}

pub struct EvmContract {
    instance: Mock1155s::Mock1155sInstance<DynProvider>,
    from: Address,
    confirmations: u64,
}

#[async_trait]
impl TokenContract for EvmContract {
    type Pending = EvmPending;

    fn address(&self) -> Address {
        *self.instance.address()
    }

    async fn submit(&self, call: &TokenCall) -> Result<EvmPending> {
        let method = call.method();
        let sent = match call {
            TokenCall::NewId {
                fungible,
                uri_a,
                uri_b,
            } => {
                self.instance
                    .newId(*fungible, uri_a.clone(), uri_b.clone())
                    .from(self.from)
                    .send()
                    .await
            }
            TokenCall::Mint {
                to,
                id,
                amount,
                data,
            } => {
                self.instance
                    .mint(*to, *id, *amount, data.clone())
                    .from(self.from)
                    .send()
                    .await
            }
        };
        let pending = sent.map_err(|e| FlowError::Submit {
            method,
            reason: e.to_string(),
        })?;
        Ok(EvmPending {
            method,
            inner: pending.with_required_confirmations(self.confirmations),
        })
    }
}

pub struct EvmPending {
    method: &'static str,
    inner: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl PendingCall for EvmPending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<Confirmation> {
        let method = self.method;
        let receipt = self
            .inner
            .get_receipt()
            .await
            .map_err(|e| FlowError::Confirm {
                method,
                reason: e.to_string(),
            })?;
        Ok(confirmation_from_receipt(method, &receipt))
    }
}

fn confirmation_from_receipt(method: &'static str, receipt: &TransactionReceipt) -> Confirmation {
    Confirmation {
        method,
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        success: receipt.status(),
    }
}
