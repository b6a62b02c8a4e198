use crate::types::{AssetId, BalanceId};
use serde::Serialize;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("can't parse owner key: {0}")]
    KeyParse(String),
    #[error("no balance objects found for the key")]
    NoBalancesFound,
    #[error("account lookup failed")]
    AccountLookupFailed(#[source] anyhow::Error),
    #[error("unknown account {0}")]
    UnknownAccount(String),
    #[error("vested balance record and balance record asset_id mismatch for {balance_id}: {vested_asset} != {balance_asset}")]
    AssetMismatch {
        balance_id: BalanceId,
        vested_asset: AssetId,
        balance_asset: AssetId,
    },
    #[error("no balances to claim")]
    EmptyClaimBatch,
    #[error("chain query failed")]
    Repository(#[source] anyhow::Error),
    #[error("claim submission failed")]
    Submission(#[source] anyhow::Error),
    #[error("no looked up balances to import")]
    NotReady,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimErrorKind {
    KeyParse,
    NoBalancesFound,
    AccountLookupFailed,
    UnknownAccount,
    AssetMismatch,
    EmptyClaimBatch,
    Repository,
    Submission,
    NotReady,
}

impl ClaimErrorKind {
    /// Translation key a front end shows for this failure.
    pub fn message_key(self) -> &'static str {
        match self {
            ClaimErrorKind::KeyParse => "errors.paste_your_redemption_key_here",
            ClaimErrorKind::NoBalancesFound => "errors.no_balance_objects",
            ClaimErrorKind::AccountLookupFailed => "errors.account_lookup_failed",
            ClaimErrorKind::UnknownAccount => "errors.unknown_account",
            ClaimErrorKind::AssetMismatch => "errors.balance_asset_mismatch",
            ClaimErrorKind::EmptyClaimBatch => "errors.no_balances_to_claim",
            ClaimErrorKind::Repository => "errors.chain_unavailable",
            ClaimErrorKind::Submission => "errors.transaction_failed",
            ClaimErrorKind::NotReady => "errors.lookup_balances_first",
        }
    }

    /// Everything except data corruption can be retried by the user.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, ClaimErrorKind::AssetMismatch)
    }
}

impl ClaimError {
    pub fn kind(&self) -> ClaimErrorKind {
        match self {
            ClaimError::KeyParse(_) => ClaimErrorKind::KeyParse,
            ClaimError::NoBalancesFound => ClaimErrorKind::NoBalancesFound,
            ClaimError::AccountLookupFailed(_) => ClaimErrorKind::AccountLookupFailed,
            ClaimError::UnknownAccount(_) => ClaimErrorKind::UnknownAccount,
            ClaimError::AssetMismatch { .. } => ClaimErrorKind::AssetMismatch,
            ClaimError::EmptyClaimBatch => ClaimErrorKind::EmptyClaimBatch,
            ClaimError::Repository(_) => ClaimErrorKind::Repository,
            ClaimError::Submission(_) => ClaimErrorKind::Submission,
            ClaimError::NotReady => ClaimErrorKind::NotReady,
        }
    }
}

/// Cloneable record of a failed step, kept in the session for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimFailure {
    pub kind: ClaimErrorKind,
    pub message: String,
}

impl From<&ClaimError> for ClaimFailure {
    fn from(error: &ClaimError) -> Self {
        // `{:#}` on anyhow sources keeps the whole context chain
        let message = match error {
            ClaimError::AccountLookupFailed(source)
            | ClaimError::Repository(source)
            | ClaimError::Submission(source) => format!("{error}: {source:#}"),
            other => other.to_string(),
        };
        Self {
            kind: error.kind(),
            message,
        }
    }
}

impl From<ClaimError> for ClaimFailure {
    fn from(error: ClaimError) -> Self {
        Self::from(&error)
    }
}

impl fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.message_key())
    }
}

impl std::error::Error for ClaimFailure {}
