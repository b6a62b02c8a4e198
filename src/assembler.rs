use crate::error::ClaimError;
use crate::types::{Account, AssetAmount, AssetId, ClaimBatch, ClaimOperation, EnrichedBalance};

/// Builds claim operations from enriched balances. Pure: same input, same batch.
#[derive(Clone, Debug)]
pub struct ClaimAssembler {
    fee_asset: AssetId,
}

impl ClaimAssembler {
    pub fn new(fee_asset: impl Into<AssetId>) -> Self {
        Self {
            fee_asset: fee_asset.into(),
        }
    }

    pub fn assemble(
        &self,
        balances: &[EnrichedBalance],
        destination: &Account,
    ) -> Result<ClaimBatch, ClaimError> {
        let mut operations = Vec::with_capacity(balances.len());

        for balance in balances {
            if let Some(vested) = &balance.vested {
                if vested.asset_id != balance.asset_id() {
                    tracing::error!(
                        target: "balance_claim::integrity",
                        "vested amount of {} is in {} but the balance holds {}",
                        balance.id(),
                        vested.asset_id,
                        balance.asset_id()
                    );
                    return Err(ClaimError::AssetMismatch {
                        balance_id: balance.id().to_string(),
                        vested_asset: vested.asset_id.clone(),
                        balance_asset: balance.asset_id().to_string(),
                    });
                }
            }

            let claimed = match &balance.vested {
                // already claimed or nothing vested yet
                Some(vested) if vested.is_zero() => continue,
                Some(vested) => vested.amount,
                None => balance.record.balance.amount,
            };

            operations.push(ClaimOperation {
                fee: AssetAmount::zero(self.fee_asset.clone()),
                deposit_to_account: destination.id.clone(),
                balance_to_claim: balance.id().to_string(),
                balance_owner_key: balance.public_key.clone(),
                total_claimed: AssetAmount::new(claimed, balance.asset_id()),
            });
        }

        ClaimBatch::from_operations(operations).ok_or(ClaimError::EmptyClaimBatch)
    }
}
