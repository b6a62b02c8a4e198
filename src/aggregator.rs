use crate::error::ClaimError;
use crate::keys::{AddressDeriver, KeyMaterial};
use crate::repository::{AccountRepository, AssetRepository, BalanceRepository};
use crate::types::{
    AssetAmount, AssetId, AssetInfo, BalanceId, BalanceRecord, EnrichedBalance, VestedAmount,
};
use anyhow::anyhow;
use futures::future::try_join_all;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

/// A balance record with its withdrawable amount settled, before any metadata is attached.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBalance {
    pub record: BalanceRecord,
    pub vested: Option<AssetAmount>,
    pub available: AssetAmount,
}

/// Turns a recovered owner key into the enriched set of claimable balances.
///
/// Every call re-fetches from the chain. Stages run in a fixed order and each one
/// only sees the output of the previous stage:
/// records -> vested amounts -> asset metadata -> names of accounts referencing the key.
pub struct BalanceAggregator {
    deriver: Arc<dyn AddressDeriver>,
    balances: Arc<dyn BalanceRepository>,
    assets: Arc<dyn AssetRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl BalanceAggregator {
    pub fn new(
        deriver: Arc<dyn AddressDeriver>,
        balances: Arc<dyn BalanceRepository>,
        assets: Arc<dyn AssetRepository>,
        accounts: Arc<dyn AccountRepository>,
    ) -> Self {
        Self {
            deriver,
            balances,
            assets,
            accounts,
        }
    }

    pub fn parse_key(&self, owner_key_text: &str) -> Result<KeyMaterial, ClaimError> {
        self.deriver.parse_key(owner_key_text)
    }

    pub async fn aggregate(
        &self,
        owner_key_text: &str,
    ) -> Result<Vec<EnrichedBalance>, ClaimError> {
        let key = self.parse_key(owner_key_text)?;
        self.aggregate_key(&key).await
    }

    pub async fn aggregate_key(
        &self,
        key: &KeyMaterial,
    ) -> Result<Vec<EnrichedBalance>, ClaimError> {
        let public_key = key.public_key_string();
        let addresses = self.deriver.addresses(key);
        tracing::debug!("looking up {} addresses of {}", addresses.len(), public_key);

        let records = self
            .balances
            .balance_objects(&addresses)
            .await
            .map_err(ClaimError::Repository)?;
        if records.is_empty() {
            tracing::info!("no balance objects for {}", public_key);
            return Err(ClaimError::NoBalancesFound);
        }
        tracing::info!("found {} balance objects for {}", records.len(), public_key);

        let vested = self.fetch_vested(&records).await?;
        let resolved = resolve_available(records, vested);
        let assets = self.fetch_assets(&distinct_asset_ids(&resolved)).await?;
        let names = self.account_names(public_key).await?;

        enrich(resolved, &assets, public_key, &names)
    }

    async fn fetch_vested(
        &self,
        records: &[BalanceRecord],
    ) -> Result<Vec<VestedAmount>, ClaimError> {
        let vesting_ids: Vec<BalanceId> = records
            .iter()
            .filter(|record| record.is_vesting())
            .map(|record| record.id.clone())
            .collect();
        if vesting_ids.is_empty() {
            return Ok(vec![]);
        }
        self.balances
            .vested_balances(&vesting_ids)
            .await
            .map_err(ClaimError::Repository)
    }

    async fn fetch_assets(
        &self,
        asset_ids: &[AssetId],
    ) -> Result<HashMap<AssetId, AssetInfo>, ClaimError> {
        let assets = try_join_all(asset_ids.iter().map(|id| self.assets.asset(id)))
            .await
            .map_err(ClaimError::Repository)?;
        Ok(assets
            .into_iter()
            .map(|asset| (asset.id.clone(), asset))
            .collect())
    }

    async fn account_names(&self, public_key: &str) -> Result<Vec<String>, ClaimError> {
        let ids: Vec<_> = self
            .accounts
            .account_refs_of_key(public_key)
            .await
            .map_err(ClaimError::AccountLookupFailed)?
            .into_iter()
            .unique()
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let accounts = try_join_all(ids.iter().map(|id| self.accounts.account(id)))
            .await
            .map_err(ClaimError::AccountLookupFailed)?;
        ids.iter()
            .zip(accounts)
            .map(|(id, account)| {
                account.map(|account| account.name).ok_or_else(|| {
                    ClaimError::AccountLookupFailed(anyhow!(
                        "account {} referenced by {} not found",
                        id,
                        public_key
                    ))
                })
            })
            .collect()
    }
}

/// Joins vested amounts to their records by balance id.
pub fn resolve_available(
    records: Vec<BalanceRecord>,
    vested: Vec<VestedAmount>,
) -> Vec<ResolvedBalance> {
    let mut vested_by_id: HashMap<BalanceId, AssetAmount> = vested
        .into_iter()
        .map(|entry| (entry.balance_id, entry.amount))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let vested = if record.is_vesting() {
                let amount = vested_by_id.remove(&record.id);
                if amount.is_none() {
                    tracing::warn!(
                        "no vested amount returned for vesting balance {}, using raw balance",
                        record.id
                    );
                }
                amount
            } else {
                None
            };
            let available = vested.clone().unwrap_or_else(|| record.balance.clone());
            ResolvedBalance {
                record,
                vested,
                available,
            }
        })
        .collect()
}

/// Asset ids in first-seen order, each once.
pub fn distinct_asset_ids(balances: &[ResolvedBalance]) -> Vec<AssetId> {
    balances
        .iter()
        .map(|balance| balance.record.balance.asset_id.clone())
        .unique()
        .collect()
}

pub fn enrich(
    resolved: Vec<ResolvedBalance>,
    assets: &HashMap<AssetId, AssetInfo>,
    public_key: &str,
    account_names: &[String],
) -> Result<Vec<EnrichedBalance>, ClaimError> {
    resolved
        .into_iter()
        .map(|balance| {
            let asset_id = &balance.record.balance.asset_id;
            let asset = assets.get(asset_id).cloned().ok_or_else(|| {
                ClaimError::Repository(anyhow!("asset {} was not fetched", asset_id))
            })?;
            Ok(EnrichedBalance {
                record: balance.record,
                asset,
                vested: balance.vested,
                available_balance: balance.available,
                public_key: public_key.to_string(),
                accounts: account_names.to_vec(),
            })
        })
        .collect()
}
