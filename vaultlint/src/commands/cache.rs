// vaultlint/src/commands/cache.rs

use crate::cli::CacheAction;
use anyhow::Result;
use std::path::Path;
use vaultlint_core::infrastructure::BridgeClient;
use vaultlint_core::ports::QueryGateway;

pub async fn run(vault: &Path, action: &CacheAction) -> Result<i32> {
    let gateway = BridgeClient::new(vault);

    match action {
        CacheAction::List => {
            let results = gateway.cached_results().await?;
            if results.is_empty() {
                println!("No stored query results.");
            } else {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        CacheAction::Clear => {
            let removed = gateway.clear_cache().await?;
            println!("Cleared {removed} stored query result(s).");
        }
    }

    Ok(0)
}
