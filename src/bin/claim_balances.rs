use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use balance_claim::config::Config;
use balance_claim::keys::GrapheneKeys;
use balance_claim::rpc::RpcClient;
use balance_claim::submit::ExportSubmitter;
use balance_claim::{BalanceAggregator, ClaimAssembler, ClaimSession, ClaimWorkflow};
use clap::Parser;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[clap(version)]
pub struct Cli {
    /// path to config file
    #[clap(long, value_parser)]
    config_path: PathBuf,

    /// claim the found balances into the configured destination account
    #[clap(long)]
    import: bool,
}

#[tokio::main]
async fn main() {
    let result = _main().await;
    result.unwrap();
}

async fn _main() -> anyhow::Result<()> {
    // Start logging setup block
    let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();

    let http_filter = tracing_subscriber::filter::Targets::new()
        // connection pool chatter drowns the claim log
        .with_target("hyper", tracing::Level::WARN)
        .with_target("reqwest", tracing::Level::WARN)
        .with_default(tracing_subscriber::fmt::Subscriber::DEFAULT_MAX_LEVEL);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(http_filter)
        .init();

    let Cli {
        config_path,
        import,
    } = Cli::parse();

    tracing::info!("Config file {:?}", config_path);
    let config = Config::load(&config_path)?;

    let owner_key = std::fs::read_to_string(&config.owner_key_path).with_context(|| {
        format!(
            "Cannot read owner key file {path}",
            path = config.owner_key_path.display()
        )
    })?;

    let client = Arc::new(RpcClient::new(&config.node)?);
    let keys = Arc::new(GrapheneKeys::new(config.chain.address_prefix.clone()));
    let aggregator = BalanceAggregator::new(keys, client.clone(), client.clone(), client.clone());
    let workflow = ClaimWorkflow::new(
        aggregator,
        ClaimAssembler::new(config.chain.core_asset.clone()),
        client,
        Arc::new(ExportSubmitter::new(config.batch_output_path.clone())),
    );

    let mut session = ClaimSession::new();
    workflow
        .lookup(&mut session, owner_key.trim())
        .await
        .map_err(|failure| anyhow!(failure))?;

    for balance in session.balances() {
        tracing::info!(
            "{} {} {} (available {}, accounts {:?})",
            balance.id(),
            balance.record.balance.amount,
            balance.asset.symbol,
            balance.available_balance.amount,
            balance.accounts
        );
    }

    if !import {
        return Ok(());
    }

    let destination = config
        .destination_account
        .as_deref()
        .ok_or_else(|| anyhow!("destination_account is not set in the config"))?;
    let confirmation = workflow
        .import(&mut session, destination)
        .await
        .map_err(|failure| anyhow!(failure))?;
    tracing::info!(
        "{} claim operations written to {}",
        confirmation.operations,
        confirmation.reference
    );

    Ok(())
}
