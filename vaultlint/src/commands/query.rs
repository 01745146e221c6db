// vaultlint/src/commands/query.rs

use crate::cli::OutputFormat;
use crate::render;
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use vaultlint_core::domain::query::{QueryData, QueryResult};
use vaultlint_core::infrastructure::BridgeClient;
use vaultlint_core::ports::QueryGateway;

/// Executes one ad-hoc query and prints the normalized rows.
pub async fn run(vault: &Path, query: &str, format: OutputFormat, no_cache: bool) -> Result<i32> {
    let gateway = if no_cache {
        BridgeClient::new(vault).without_cache()
    } else {
        BridgeClient::new(vault)
    };

    let started = Instant::now();
    let record = gateway.execute(query).await?;
    let result = QueryResult::from_record(query.to_string(), record, started.elapsed());

    if !result.success {
        let error = result.error.as_deref().unwrap_or("unknown error");
        eprintln!("❌ Query failed: {error}");
        return Ok(1);
    }

    let data = QueryData::from_result(&result);
    match format {
        OutputFormat::Table => render::print_query_data(&data),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data.to_value())?),
    }

    Ok(0)
}
