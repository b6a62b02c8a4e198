use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type BalanceId = String;
pub type AssetId = String;
pub type AccountId = String;

/// Legacy or native address string derived from a public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    #[serde(deserialize_with = "deserialize_share")]
    pub amount: i64,
    pub asset_id: AssetId,
}

impl AssetAmount {
    pub fn new(amount: i64, asset_id: impl Into<AssetId>) -> Self {
        Self {
            amount,
            asset_id: asset_id.into(),
        }
    }

    pub fn zero(asset_id: impl Into<AssetId>) -> Self {
        Self::new(0, asset_id)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

// nodes emit int64 shares either as json numbers or as strings
fn deserialize_share<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Share {
        Number(i64),
        Text(String),
    }

    match Share::deserialize(deserializer)? {
        Share::Number(value) => Ok(value),
        Share::Text(text) => text.parse::<i64>().map_err(serde::de::Error::custom),
    }
}

/// Raw balance object as stored on chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub id: BalanceId,
    pub owner: Address,
    pub balance: AssetAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_policy: Option<serde_json::Value>,
}

impl BalanceRecord {
    pub fn is_vesting(&self) -> bool {
        self.vesting_policy.is_some()
    }
}

/// Withdrawable part of a vesting balance, tagged with the balance it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestedAmount {
    pub balance_id: BalanceId,
    pub amount: AssetAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub id: AssetId,
    pub symbol: String,
    pub precision: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
}

/// A balance record joined with everything needed to display and claim it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnrichedBalance {
    pub record: BalanceRecord,
    pub asset: AssetInfo,
    pub vested: Option<AssetAmount>,
    pub available_balance: AssetAmount,
    pub public_key: String,
    pub accounts: Vec<String>,
}

impl EnrichedBalance {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn asset_id(&self) -> &str {
        &self.record.balance.asset_id
    }
}

/// A single `balance_claim` operation, serialized with the chain's field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOperation {
    pub fee: AssetAmount,
    pub deposit_to_account: AccountId,
    pub balance_to_claim: BalanceId,
    pub balance_owner_key: String,
    pub total_claimed: AssetAmount,
}

/// Ordered claim operations. Only the assembler builds one, and never an empty one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimBatch(Vec<ClaimOperation>);

impl ClaimBatch {
    pub(crate) fn from_operations(operations: Vec<ClaimOperation>) -> Option<Self> {
        if operations.is_empty() {
            None
        } else {
            Some(Self(operations))
        }
    }

    pub fn operations(&self) -> &[ClaimOperation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// What the submission layer reports back once a batch is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub reference: String,
    pub operations: usize,
}

#[cfg(test)]
mod tests {
    use crate::types::{AssetAmount, BalanceRecord};
    use serde_json::json;

    #[test]
    fn share_accepts_numbers_and_strings() {
        let number: AssetAmount =
            serde_json::from_value(json!({"amount": 150, "asset_id": "1.3.0"})).unwrap();
        let text: AssetAmount =
            serde_json::from_value(json!({"amount": "150", "asset_id": "1.3.0"})).unwrap();
        assert_eq!(number, text);
        assert_eq!(number, AssetAmount::new(150, "1.3.0"));

        assert!(serde_json::from_value::<AssetAmount>(
            json!({"amount": "lots", "asset_id": "1.3.0"})
        )
        .is_err());
    }

    #[test]
    fn balance_record_from_node_json() {
        let record: BalanceRecord = serde_json::from_value(json!({
            "id": "1.15.7",
            "owner": "PPYFAbAWaGpCXiKhfG6p1oE8jQ3XZDYyxmbL",
            "balance": {"amount": "4200", "asset_id": "1.3.0"},
            "last_claim_date": "1970-01-01T00:00:00",
            "vesting_policy": {
                "begin_timestamp": "2017-01-01T00:00:00",
                "vesting_cliff_seconds": 0,
                "vesting_duration_seconds": 31536000,
                "begin_balance": 4200
            }
        }))
        .unwrap();
        assert!(record.is_vesting());
        assert_eq!(record.balance.amount, 4200);

        let plain: BalanceRecord = serde_json::from_value(json!({
            "id": "1.15.8",
            "owner": "PPYFAbAWaGpCXiKhfG6p1oE8jQ3XZDYyxmbL",
            "balance": {"amount": 1, "asset_id": "1.3.2"}
        }))
        .unwrap();
        assert!(!plain.is_vesting());
    }
}
