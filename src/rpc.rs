use crate::config::NodeConfig;
use crate::repository::{AccountRepository, AssetRepository, BalanceRepository};
use crate::types::{
    Account, AccountId, Address, AssetAmount, AssetInfo, BalanceId, BalanceRecord, VestedAmount,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

const DATABASE_API: &str = "database";

#[derive(Clone, Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC client for a graphene node's database api over http.
pub struct RpcClient {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP Client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<T> {
        let body = self.send(method, &params).await?;
        decode_response(method, body)
    }

    async fn send(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "call",
            "params": [DATABASE_API, method, params],
        });
        tracing::debug!("rpc #{} {} {}", id, method, params);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send {method} to {}", self.endpoint))?;

        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .with_context(|| format!("Expect the node to return json for {method}")),
            code => Err(anyhow!("{} failed with status {:?}", method, code)),
        }
    }
}

fn decode_response<T: DeserializeOwned>(
    method: &str,
    body: serde_json::Value,
) -> anyhow::Result<T> {
    let response: RpcResponse<T> = serde_json::from_value(body)
        .with_context(|| format!("Unexpected response shape for {method}"))?;
    match (response.result, response.error) {
        (_, Some(error)) => Err(anyhow!(
            "{} rejected by node ({}): {}",
            method,
            error.code,
            error.message
        )),
        (Some(result), None) => Ok(result),
        (None, None) => Err(anyhow!("{} returned neither result nor error", method)),
    }
}

// the node answers positionally, the rest of the crate works with ids
fn tag_vested(
    balance_ids: &[BalanceId],
    amounts: Vec<AssetAmount>,
) -> anyhow::Result<Vec<VestedAmount>> {
    if balance_ids.len() != amounts.len() {
        return Err(anyhow!(
            "requested vested balances for {} objects, got {}",
            balance_ids.len(),
            amounts.len()
        ));
    }
    Ok(balance_ids
        .iter()
        .cloned()
        .zip(amounts)
        .map(|(balance_id, amount)| VestedAmount { balance_id, amount })
        .collect())
}

pub fn is_account_id(name_or_id: &str) -> bool {
    name_or_id
        .strip_prefix("1.2.")
        .map(|instance| !instance.is_empty() && instance.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[async_trait]
impl BalanceRepository for RpcClient {
    async fn balance_objects(&self, addresses: &[Address]) -> anyhow::Result<Vec<BalanceRecord>> {
        self.call("get_balance_objects", json!([addresses])).await
    }

    async fn vested_balances(
        &self,
        balance_ids: &[BalanceId],
    ) -> anyhow::Result<Vec<VestedAmount>> {
        let amounts: Vec<AssetAmount> = self
            .call("get_vested_balances", json!([balance_ids]))
            .await?;
        tag_vested(balance_ids, amounts)
    }
}

#[async_trait]
impl AssetRepository for RpcClient {
    async fn asset(&self, asset_id: &str) -> anyhow::Result<AssetInfo> {
        let mut assets: Vec<Option<AssetInfo>> =
            self.call("get_assets", json!([[asset_id]])).await?;
        assets
            .pop()
            .flatten()
            .ok_or_else(|| anyhow!("asset {} not found", asset_id))
    }
}

#[async_trait]
impl AccountRepository for RpcClient {
    async fn account_refs_of_key(&self, public_key: &str) -> anyhow::Result<Vec<AccountId>> {
        let mut refs: Vec<Vec<AccountId>> = self
            .call("get_key_references", json!([[public_key]]))
            .await?;
        Ok(refs.pop().unwrap_or_default())
    }

    async fn account(&self, name_or_id: &str) -> anyhow::Result<Option<Account>> {
        let method = if is_account_id(name_or_id) {
            "get_accounts"
        } else {
            "lookup_account_names"
        };
        let mut accounts: Vec<Option<Account>> =
            self.call(method, json!([[name_or_id]])).await?;
        Ok(accounts.pop().flatten())
    }
}
