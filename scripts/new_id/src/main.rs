// scripts/new_id/src/main.rs

use anyhow::{Context, Result};
use common::{load_config, new_id_flow, EvmClient, NewIdPlan};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("common=info,new_id=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env (RPC_URL, PRIVATE_KEY, CONFIRMATIONS)
    let cfg = load_config()?;
    let client = EvmClient::connect(&cfg);

    // newId(false, "", "") then mint(signer, 3, 500, [])
    let report = new_id_flow(&client, &NewIdPlan::default())
        .await
        .context("newId script failed")?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
