//! In-memory chain and submitter shared by the unit tests.

use crate::aggregator::BalanceAggregator;
use crate::assembler::ClaimAssembler;
use crate::keys::{encode_wif, AddressDeriver, GrapheneKeys, KeyMaterial};
use crate::repository::{AccountRepository, AssetRepository, BalanceRepository};
use crate::submit::ClaimSubmitter;
use crate::types::{
    Account, AccountId, Address, AssetAmount, AssetId, AssetInfo, BalanceId, BalanceRecord,
    ClaimBatch, Confirmation, VestedAmount,
};
use crate::workflow::ClaimWorkflow;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const OWNER_SECRET: [u8; 32] = [0x2a; 32];

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    BalanceObjects(usize),
    VestedBalances(Vec<BalanceId>),
    Asset(AssetId),
    AccountRefs(String),
    Account(String),
}

#[derive(Default)]
pub struct InMemoryChain {
    balances: Vec<BalanceRecord>,
    vested: HashMap<BalanceId, AssetAmount>,
    assets: HashMap<AssetId, AssetInfo>,
    accounts: Vec<Account>,
    key_refs: HashMap<String, Vec<AccountId>>,
    reverse_vested: bool,
    fail_vested: bool,
    fail_account_refs: bool,
    calls: Mutex<Vec<Call>>,
}

impl InMemoryChain {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_vested(&mut self, balance_id: &str, amount: AssetAmount) {
        self.vested.insert(balance_id.to_string(), amount);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BalanceRepository for InMemoryChain {
    async fn balance_objects(&self, addresses: &[Address]) -> anyhow::Result<Vec<BalanceRecord>> {
        self.record(Call::BalanceObjects(addresses.len()));
        Ok(self
            .balances
            .iter()
            .filter(|record| addresses.contains(&record.owner))
            .cloned()
            .collect())
    }

    async fn vested_balances(
        &self,
        balance_ids: &[BalanceId],
    ) -> anyhow::Result<Vec<VestedAmount>> {
        self.record(Call::VestedBalances(balance_ids.to_vec()));
        if self.fail_vested {
            return Err(anyhow!("vesting balance index unavailable"));
        }
        let mut vested: Vec<_> = balance_ids
            .iter()
            .filter_map(|id| {
                self.vested.get(id).map(|amount| VestedAmount {
                    balance_id: id.clone(),
                    amount: amount.clone(),
                })
            })
            .collect();
        if self.reverse_vested {
            vested.reverse();
        }
        Ok(vested)
    }
}

#[async_trait]
impl AssetRepository for InMemoryChain {
    async fn asset(&self, asset_id: &str) -> anyhow::Result<AssetInfo> {
        self.record(Call::Asset(asset_id.to_string()));
        self.assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| anyhow!("asset {} not found", asset_id))
    }
}

#[async_trait]
impl AccountRepository for InMemoryChain {
    async fn account_refs_of_key(&self, public_key: &str) -> anyhow::Result<Vec<AccountId>> {
        self.record(Call::AccountRefs(public_key.to_string()));
        if self.fail_account_refs {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.key_refs.get(public_key).cloned().unwrap_or_default())
    }

    async fn account(&self, name_or_id: &str) -> anyhow::Result<Option<Account>> {
        self.record(Call::Account(name_or_id.to_string()));
        Ok(self
            .accounts
            .iter()
            .find(|account| account.id == name_or_id || account.name == name_or_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordingSubmitter {
    submitted: Mutex<Vec<(ClaimBatch, AccountId, String)>>,
    fail: AtomicBool,
}

impl RecordingSubmitter {
    pub fn submitted(&self) -> Vec<(ClaimBatch, AccountId, String)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClaimSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        batch: &ClaimBatch,
        payer: &AccountId,
        key: &KeyMaterial,
    ) -> anyhow::Result<Confirmation> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("missing required active authority"));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((
            batch.clone(),
            payer.clone(),
            key.public_key_string().to_string(),
        ));
        Ok(Confirmation {
            reference: format!("tx-{}", submitted.len()),
            operations: batch.len(),
        })
    }
}

pub fn plain(id: &str, owner: &Address, amount: i64, asset_id: &str) -> BalanceRecord {
    BalanceRecord {
        id: id.to_string(),
        owner: owner.clone(),
        balance: AssetAmount::new(amount, asset_id),
        vesting_policy: None,
    }
}

pub fn vesting(id: &str, owner: &Address, amount: i64, asset_id: &str) -> BalanceRecord {
    BalanceRecord {
        vesting_policy: Some(json!({
            "begin_timestamp": "2017-06-01T00:00:00",
            "vesting_cliff_seconds": 0,
            "vesting_duration_seconds": 63072000,
            "begin_balance": amount
        })),
        ..plain(id, owner, amount, asset_id)
    }
}

/// A known owner key plus an empty chain; builder methods fill the chain before use.
pub struct Fixture {
    pub keys: Arc<GrapheneKeys>,
    pub key: KeyMaterial,
    pub wif: String,
    pub addresses: Vec<Address>,
    pub chain: Arc<InMemoryChain>,
    pub submitter: Arc<RecordingSubmitter>,
}

impl Fixture {
    pub fn new() -> Self {
        let keys = Arc::new(GrapheneKeys::new("PPY"));
        let wif = encode_wif(&OWNER_SECRET, false);
        let key = keys.parse_key(&wif).unwrap();
        let addresses = keys.addresses(&key);
        Self {
            keys,
            key,
            wif,
            addresses,
            chain: Arc::new(InMemoryChain::default()),
            submitter: Arc::new(RecordingSubmitter::default()),
        }
    }

    pub fn chain_mut(&mut self) -> &mut InMemoryChain {
        Arc::get_mut(&mut self.chain).expect("chain already shared")
    }

    pub fn with_asset(mut self, id: &str, symbol: &str, precision: u8) -> Self {
        self.chain_mut().assets.insert(
            id.to_string(),
            AssetInfo {
                id: id.to_string(),
                symbol: symbol.to_string(),
                precision,
            },
        );
        self
    }

    /// Plain balance recorded under the native short address.
    pub fn with_plain(mut self, id: &str, amount: i64, asset_id: &str) -> Self {
        let owner = self.addresses[4].clone();
        self.chain_mut()
            .balances
            .push(plain(id, &owner, amount, asset_id));
        self
    }

    /// Vesting balance recorded under a legacy compressed address.
    pub fn with_vesting(mut self, id: &str, amount: i64, asset_id: &str) -> Self {
        let owner = self.addresses[1].clone();
        self.chain_mut()
            .balances
            .push(vesting(id, &owner, amount, asset_id));
        self
    }

    pub fn with_balance(mut self, record: BalanceRecord) -> Self {
        self.chain_mut().balances.push(record);
        self
    }

    pub fn with_vested(mut self, balance_id: &str, amount: i64, asset_id: &str) -> Self {
        self.chain_mut()
            .set_vested(balance_id, AssetAmount::new(amount, asset_id));
        self
    }

    pub fn with_account(mut self, id: &str, name: &str, references_key: bool) -> Self {
        let public_key = self.key.public_key_string().to_string();
        let chain = self.chain_mut();
        chain.accounts.push(Account {
            id: id.to_string(),
            name: name.to_string(),
        });
        if references_key {
            chain
                .key_refs
                .entry(public_key)
                .or_default()
                .push(id.to_string());
        }
        self
    }

    pub fn reversing_vested(mut self) -> Self {
        self.chain_mut().reverse_vested = true;
        self
    }

    pub fn failing_vested(mut self) -> Self {
        self.chain_mut().fail_vested = true;
        self
    }

    /// Key reference to an account id the chain has no object for.
    pub fn with_dangling_reference(mut self, id: &str) -> Self {
        let public_key = self.key.public_key_string().to_string();
        self.chain_mut()
            .key_refs
            .entry(public_key)
            .or_default()
            .push(id.to_string());
        self
    }

    pub fn failing_account_refs(mut self) -> Self {
        self.chain_mut().fail_account_refs = true;
        self
    }

    pub fn aggregator(&self) -> BalanceAggregator {
        BalanceAggregator::new(
            self.keys.clone(),
            self.chain.clone(),
            self.chain.clone(),
            self.chain.clone(),
        )
    }

    pub fn workflow(&self) -> ClaimWorkflow {
        ClaimWorkflow::new(
            self.aggregator(),
            ClaimAssembler::new("1.3.0"),
            self.chain.clone(),
            self.submitter.clone(),
        )
    }
}
