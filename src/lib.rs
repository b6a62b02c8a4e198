//! Lookup and import of pre-existing chain balances owned by a recovered private key.
//!
//! A lookup derives the key's candidate addresses, fetches the balance objects they own and
//! joins vested amounts, asset metadata and referencing account names onto them. An import
//! turns that snapshot into a batch of `balance_claim` operations for a destination account
//! and hands it to a [`submit::ClaimSubmitter`].

pub mod aggregator;
pub mod assembler;
pub mod config;
pub mod error;
pub mod keys;
pub mod repository;
pub mod rpc;
pub mod submit;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::BalanceAggregator;
pub use assembler::ClaimAssembler;
pub use error::{ClaimError, ClaimErrorKind, ClaimFailure};
pub use workflow::session::{ClaimSession, ClaimState};
pub use workflow::ClaimWorkflow;
