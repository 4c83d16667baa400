//! Per-network configuration: base token, RAILGUN contracts and fee schedule.
//!
//! A built-in table covers the networks RAILGUN is deployed on. Deployments that need other
//! values (forks, test networks, fee changes) load a YAML file instead:
//!
//! ```yaml
//! networks:
//!   ethereum:
//!     wrapped_base_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
//!     base_token_decimals: 18
//!     railgun_proxy: "0xFA7093CDD9EE6932B4eb2c9e1cde7CE00B1FA4b9"
//!     relay_adapt: "0x4025ee6512DBbda97049Bcf5AA5D38C54aF6bE8a"
//!     shield_fee_bps: 25
//!     unshield_fee_bps: 25
//! ```

use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{ERC20Info, NetworkName};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read network config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse network config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("No configuration for network {0}")]
    MissingNetwork(NetworkName),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Wrapped version of the base token (WETH, WMATIC, ...).
    pub wrapped_base_token: Address,
    pub base_token_decimals: u8,
    pub railgun_proxy: Address,
    /// Contract that executes cross contract calls on behalf of the shielded wallet.
    pub relay_adapt: Address,
    pub shield_fee_bps: u32,
    pub unshield_fee_bps: u32,
}

impl NetworkConfig {
    pub fn wrapped_base_token(&self) -> ERC20Info {
        ERC20Info::contract(self.wrapped_base_token, self.base_token_decimals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfigs {
    networks: BTreeMap<NetworkName, NetworkConfig>,
}

impl NetworkConfigs {
    pub fn new(networks: BTreeMap<NetworkName, NetworkConfig>) -> Self {
        Self { networks }
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let configs: NetworkConfigs = serde_yaml::from_str(contents)?;
        debug!(networks = configs.networks.len(), "Loaded network configs");
        Ok(configs)
    }

    pub fn get(&self, network: NetworkName) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .get(&network)
            .ok_or(ConfigError::MissingNetwork(network))
    }

    pub fn supports(&self, network: NetworkName) -> bool {
        self.networks.contains_key(&network)
    }

    /// Replaces or adds the configuration of a single network.
    pub fn with_network(mut self, network: NetworkName, config: NetworkConfig) -> Self {
        self.networks.insert(network, config);
        self
    }
}

const DEFAULT_FEE_BPS: u32 = 25;

impl Default for NetworkConfigs {
    fn default() -> Self {
        let network = |wrapped_base_token, railgun_proxy, relay_adapt| NetworkConfig {
            wrapped_base_token,
            base_token_decimals: 18,
            railgun_proxy,
            relay_adapt,
            shield_fee_bps: DEFAULT_FEE_BPS,
            unshield_fee_bps: DEFAULT_FEE_BPS,
        };

        let networks = BTreeMap::from([
            (
                NetworkName::Ethereum,
                network(
                    address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
                    address!("FA7093CDD9EE6932B4eb2c9e1cde7CE00B1FA4b9"),
                    address!("4025ee6512DBbda97049Bcf5AA5D38C54aF6bE8a"),
                ),
            ),
            (
                NetworkName::Polygon,
                network(
                    address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
                    address!("19B620929f97b7b990801496c3b361CA5dEf8C71"),
                    address!("F82d00fC51F730F42A00F85E74895a2849ffF2Dd"),
                ),
            ),
            (
                NetworkName::Bsc,
                network(
                    address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
                    address!("590162bf4b50F6576a459B75309eE21D92178A10"),
                    address!("741936fbE1dbB4f4C4A0dd1D2E3f1D1e6e0cD9Fd"),
                ),
            ),
            (
                NetworkName::Arbitrum,
                network(
                    address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
                    address!("FA7093CDD9EE6932B4eb2c9e1cde7CE00B1FA4b9"),
                    address!("5aD95C537b002770a39dea342c4bb2b68B1497aA"),
                ),
            ),
            (
                NetworkName::Hardhat,
                network(
                    address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
                    address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
                    address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"),
                ),
            ),
        ]);

        Self { networks }
    }
}
