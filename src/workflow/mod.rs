pub mod session;

use crate::aggregator::BalanceAggregator;
use crate::assembler::ClaimAssembler;
use crate::error::{ClaimError, ClaimFailure};
use crate::keys::KeyMaterial;
use crate::repository::AccountRepository;
use crate::submit::ClaimSubmitter;
use crate::types::{Confirmation, EnrichedBalance};
use session::{ClaimSession, ReadyClaim};
use std::sync::Arc;

/// Lookup and import steps of a claim, with failures turned into `ClaimFailure`s at this boundary.
pub struct ClaimWorkflow {
    aggregator: BalanceAggregator,
    assembler: ClaimAssembler,
    accounts: Arc<dyn AccountRepository>,
    submitter: Arc<dyn ClaimSubmitter>,
}

impl ClaimWorkflow {
    pub fn new(
        aggregator: BalanceAggregator,
        assembler: ClaimAssembler,
        accounts: Arc<dyn AccountRepository>,
        submitter: Arc<dyn ClaimSubmitter>,
    ) -> Self {
        Self {
            aggregator,
            assembler,
            accounts,
            submitter,
        }
    }

    /// Runs a fresh lookup and stores the outcome in `session`. Returns the number of balances found.
    pub async fn lookup(
        &self,
        session: &mut ClaimSession,
        key_text: &str,
    ) -> Result<usize, ClaimFailure> {
        let attempt = session.begin_lookup(key_text);
        let result = self.run_lookup(key_text).await.map_err(report);
        let outcome = result
            .as_ref()
            .map(|(_, balances)| balances.len())
            .map_err(Clone::clone);
        session.finish_lookup(attempt, result);
        outcome
    }

    pub async fn run_lookup(
        &self,
        key_text: &str,
    ) -> Result<(KeyMaterial, Vec<EnrichedBalance>), ClaimError> {
        let key = self.aggregator.parse_key(key_text)?;
        let balances = self.aggregator.aggregate_key(&key).await?;
        Ok((key, balances))
    }

    /// Claims the balances of the session's `Ready` snapshot into `destination` (account name or id).
    pub async fn import(
        &self,
        session: &mut ClaimSession,
        destination: &str,
    ) -> Result<Confirmation, ClaimFailure> {
        let (attempt, ready) = session.begin_import().map_err(report)?;
        let result = self.run_import(&ready, destination).await.map_err(report);
        session.finish_import(attempt, result.clone());
        result
    }

    pub async fn run_import(
        &self,
        ready: &ReadyClaim,
        destination: &str,
    ) -> Result<Confirmation, ClaimError> {
        let account = self
            .accounts
            .account(destination)
            .await
            .map_err(ClaimError::Repository)?
            .ok_or_else(|| ClaimError::UnknownAccount(destination.to_string()))?;

        let batch = self.assembler.assemble(&ready.balances, &account)?;
        tracing::info!(
            "submitting {} of {} balances to {} ({})",
            batch.len(),
            ready.balances.len(),
            account.name,
            account.id
        );

        let confirmation = self
            .submitter
            .submit(&batch, &account.id, &ready.key)
            .await
            .map_err(ClaimError::Submission)?;
        tracing::info!("claim accepted: {}", confirmation.reference);
        Ok(confirmation)
    }
}

fn report(error: ClaimError) -> ClaimFailure {
    let failure = ClaimFailure::from(&error);
    if failure.kind.is_recoverable() {
        tracing::warn!("{}", failure);
    }
    failure
}
