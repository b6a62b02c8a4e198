use crate::keys::KeyMaterial;
use crate::types::{AccountId, ClaimBatch, Confirmation};
use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

/// Signs and broadcasts a claim batch. Implementations own fees, signing and transport.
#[async_trait]
pub trait ClaimSubmitter: Send + Sync {
    async fn submit(
        &self,
        batch: &ClaimBatch,
        payer: &AccountId,
        key: &KeyMaterial,
    ) -> anyhow::Result<Confirmation>;
}

#[derive(Serialize)]
struct UnsignedClaims<'a> {
    payer: &'a str,
    signing_key: &'a str,
    operations: &'a ClaimBatch,
}

/// Writes the unsigned batch to a file for an offline signer. The private key never leaves memory.
#[derive(Clone, Debug)]
pub struct ExportSubmitter {
    path: PathBuf,
}

impl ExportSubmitter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ClaimSubmitter for ExportSubmitter {
    async fn submit(
        &self,
        batch: &ClaimBatch,
        payer: &AccountId,
        key: &KeyMaterial,
    ) -> anyhow::Result<Confirmation> {
        let unsigned = UnsignedClaims {
            payer,
            signing_key: key.public_key_string(),
            operations: batch,
        };
        let bytes = serde_json::to_vec_pretty(&unsigned)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Cannot write claim batch to {}", self.path.display()))?;
        tracing::info!(
            "exported {} claim operations to {:?}",
            batch.len(),
            self.path
        );
        Ok(Confirmation {
            reference: self.path.display().to_string(),
            operations: batch.len(),
        })
    }
}
