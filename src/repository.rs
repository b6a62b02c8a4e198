use crate::types::{Account, AccountId, Address, AssetInfo, BalanceId, BalanceRecord, VestedAmount};
use async_trait::async_trait;

#[async_trait]
pub trait BalanceRepository: Send + Sync {
    /// Balance objects owned by any of `addresses`, in the order the node returns them.
    async fn balance_objects(&self, addresses: &[Address]) -> anyhow::Result<Vec<BalanceRecord>>;

    /// One batched call for all `balance_ids`. Each entry names the balance it belongs to.
    async fn vested_balances(&self, balance_ids: &[BalanceId])
        -> anyhow::Result<Vec<VestedAmount>>;
}

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn asset(&self, asset_id: &str) -> anyhow::Result<AssetInfo>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn account_refs_of_key(&self, public_key: &str) -> anyhow::Result<Vec<AccountId>>;

    /// Resolves an account by `1.2.x` id or by name. `None` if the chain has no such account.
    async fn account(&self, name_or_id: &str) -> anyhow::Result<Option<Account>>;
}
