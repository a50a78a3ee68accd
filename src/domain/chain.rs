//! Supported chains and their hosted node endpoints

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

const INFURA_URL_PATTERN: &str = "https://{chain}.infura.io/v3/{key}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Mainnet,
    Sepolia,
}

impl Chain {
    pub fn name(self) -> &'static str {
        match self {
            Chain::Mainnet => "mainnet",
            Chain::Sepolia => "sepolia",
        }
    }

    /// EIP-155 chain id the node is expected to report
    pub fn chain_id(self) -> u64 {
        match self {
            Chain::Mainnet => 1,
            Chain::Sepolia => 11_155_111,
        }
    }

    /// Infura HTTP endpoint for this chain
    pub fn infura_url(self, key: &str) -> String {
        INFURA_URL_PATTERN
            .replace("{chain}", self.name())
            .replace("{key}", key.trim())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
