// common/src/lib.rs
use alloy::primitives::{address, Address, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use dotenv::dotenv;
use reqwest::Url;
use serde::Serialize;
use std::env;
use std::fmt;
use tracing::{info, warn};

pub mod client;
pub mod error;
pub mod evm;

pub use client::{Confirmation, NetworkClient, PendingCall, TokenCall, TokenContract};
pub use error::{FlowError, Result};
pub use evm::EvmClient;

// ─────────────────── Configuration ───────────────────

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

pub struct Config {
    pub rpc_url: Url,
    /// Local signer from `PRIVATE_KEY`; `None` means the node signs.
    pub signer: Option<PrivateKeySigner>,
    pub confirmations: u64,
}

// Only the signer's address is printed, never the key.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .field("confirmations", &self.confirmations)
            .finish()
    }
}

impl Config {
    /// Build from any key lookup; `load_config` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_url = lookup("RPC_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(raw_url.trim())
            .map_err(|e| FlowError::Config(format!("invalid RPC_URL {raw_url:?}: {e}")))?;

        let signer = match lookup("PRIVATE_KEY").filter(|s| !s.trim().is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| FlowError::Config(format!("invalid PRIVATE_KEY: {e}")))?,
            ),
        };

        let confirmations = match lookup("CONFIRMATIONS").filter(|s| !s.trim().is_empty()) {
            None => 1,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(FlowError::Config(format!(
                        "CONFIRMATIONS must be a positive integer, got {raw:?}"
                    )))
                }
            },
        };

        Ok(Config {
            rpc_url,
            signer,
            confirmations,
        })
    }
}

/// Load `.env` (RPC_URL, PRIVATE_KEY, CONFIRMATIONS) then read the environment.
pub fn load_config() -> Result<Config> {
    dotenv().ok();
    Config::from_lookup(|key| env::var(key).ok())
}

// ─────────────────── newId → mint Flow ───────────────────

/// Deployed Mock1155s instance the script targets.
pub const MOCK1155S_ADDRESS: Address = address!("25d4a73b44ba47f515238b48e05dd0e29e76ad29");
pub const NEW_ID_FUNGIBLE: bool = false;
/// Id minted after `newId`. Assumed to be the one `newId` just issued; the
/// issued value is never read back, so this drifts if the contract's counter
/// is not at 3.
pub const MINT_ID: u64 = 3;
pub const MINT_AMOUNT: u64 = 500;

#[derive(Debug, Clone)]
pub struct NewIdPlan {
    pub contract: Address,
    pub fungible: bool,
    pub uri_a: String,
    pub uri_b: String,
    pub mint_id: U256,
    pub mint_amount: U256,
    pub mint_data: Bytes,
}

impl Default for NewIdPlan {
    fn default() -> Self {
        NewIdPlan {
            contract: MOCK1155S_ADDRESS,
            fungible: NEW_ID_FUNGIBLE,
            uri_a: String::new(),
            uri_b: String::new(),
            mint_id: U256::from(MINT_ID),
            mint_amount: U256::from(MINT_AMOUNT),
            mint_data: Bytes::new(),
        }
    }
}

impl NewIdPlan {
    pub fn new_id_call(&self) -> TokenCall {
        TokenCall::NewId {
            fungible: self.fungible,
            uri_a: self.uri_a.clone(),
            uri_b: self.uri_b.clone(),
        }
    }

    pub fn mint_call(&self, to: Address) -> TokenCall {
        TokenCall::Mint {
            to,
            id: self.mint_id,
            amount: self.mint_amount,
            data: self.mint_data.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub signer: Address,
    pub contract: Address,
    pub calls: Vec<Confirmation>,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Submit one call and wait for it to be mined. A reverted receipt is an error.
async fn send_and_confirm<T: TokenContract>(contract: &T, call: TokenCall) -> Result<Confirmation> {
    let method = call.method();
    let pending = contract.submit(&call).await?;
    info!(method, tx_hash = %pending.tx_hash(), "submitted");

    let confirmation = pending.confirm().await?;
    if !confirmation.success {
        warn!(method, tx_hash = %confirmation.tx_hash, "receipt reports revert");
        return Err(FlowError::Reverted {
            method,
            tx_hash: confirmation.tx_hash,
        });
    }
    info!(
        method,
        tx_hash = %confirmation.tx_hash,
        block = ?confirmation.block_number,
        gas_used = confirmation.gas_used,
        "confirmed"
    );
    Ok(confirmation)
}

/// Issue a new id, then mint `plan.mint_amount` of `plan.mint_id` to the signer.
///
/// Strictly sequential: `mint` is only submitted once `newId` is confirmed.
/// Nothing is rolled back if `mint` fails after `newId` went through.
pub async fn new_id_flow<C: NetworkClient>(client: &C, plan: &NewIdPlan) -> Result<RunReport> {
    // 1. Signer
    let signer = client.first_signer().await?;
    info!(%signer, "signer resolved");

    // 2. Contract handle
    let contract = client.attach(plan.contract, signer).await?;
    info!(contract = %contract.address(), "attached to Mock1155s");

    // 3. newId
    let issued = send_and_confirm(&contract, plan.new_id_call()).await?;

    // 4. mint
    let minted = send_and_confirm(&contract, plan.mint_call(signer)).await?;

    Ok(RunReport {
        signer,
        contract: contract.address(),
        calls: vec![issued, minted],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Well-known first dev-node account.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_to_local_node() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.rpc_url.as_str(), "http://127.0.0.1:8545/");
        assert!(cfg.signer.is_none());
        assert_eq!(cfg.confirmations, 1);
    }

    #[test]
    fn config_reads_all_keys() {
        let padded_key = format!(" {DEV_KEY} ");
        let cfg = Config::from_lookup(lookup(&[
            ("RPC_URL", "https://rpc.example.org"),
            ("PRIVATE_KEY", padded_key.as_str()),
            ("CONFIRMATIONS", "3"),
        ]))
        .unwrap();
        assert_eq!(cfg.rpc_url.host_str(), Some("rpc.example.org"));
        assert_eq!(cfg.signer.map(|s| s.address()), Some(DEV_ADDRESS));
        assert_eq!(cfg.confirmations, 3);
    }

    #[test]
    fn blank_private_key_means_node_accounts() {
        let cfg = Config::from_lookup(lookup(&[("PRIVATE_KEY", "   ")])).unwrap();
        assert!(cfg.signer.is_none());
    }

    #[test]
    fn unparseable_private_key_is_a_config_error() {
        for raw in ["0xabc", "not hex at all"] {
            let bad = Config::from_lookup(lookup(&[("PRIVATE_KEY", raw)]));
            assert!(matches!(bad, Err(FlowError::Config(_))), "accepted {raw}");
        }
    }

    #[test]
    fn debug_output_hides_private_key() {
        let cfg = Config::from_lookup(lookup(&[("PRIVATE_KEY", DEV_KEY)])).unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains(&DEV_KEY[2..]));
        assert!(printed.to_lowercase().contains("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    }

    #[test]
    fn config_rejects_bad_values() {
        let bad_url = Config::from_lookup(lookup(&[("RPC_URL", "not a url")]));
        assert!(matches!(bad_url, Err(FlowError::Config(_))));

        for raw in ["0", "-1", "many"] {
            let bad = Config::from_lookup(lookup(&[("CONFIRMATIONS", raw)]));
            assert!(matches!(bad, Err(FlowError::Config(_))), "accepted {raw}");
        }
    }

    #[test]
    fn default_plan_matches_script_constants() {
        let plan = NewIdPlan::default();
        assert_eq!(
            plan.contract,
            "0x25d4a73b44ba47f515238b48e05dd0e29e76ad29".parse::<Address>().unwrap()
        );
        assert_eq!(
            plan.new_id_call(),
            TokenCall::NewId {
                fungible: false,
                uri_a: String::new(),
                uri_b: String::new(),
            }
        );

        let to = Address::repeat_byte(0x11);
        assert_eq!(
            plan.mint_call(to),
            TokenCall::Mint {
                to,
                id: U256::from(3),
                amount: U256::from(500),
                data: Bytes::new(),
            }
        );
    }
}
