use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
    #[serde(default = "default_core_asset")]
    pub core_asset: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            address_prefix: default_address_prefix(),
            core_asset: default_core_asset(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    pub owner_key_path: PathBuf,
    #[serde(default)]
    pub destination_account: Option<String>,
    pub batch_output_path: PathBuf,
}

fn default_address_prefix() -> String {
    "PPY".to_string()
}

fn default_core_asset() -> String {
    "1.3.0".to_string()
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot read config file {path}", path = path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("Cannot parse config file {path}", path = path.display()))
    }
}
