use alloy_primitives::Address;
use async_trait::async_trait;
use cookbook_common::{config::NetworkConfigs, models::NetworkName};

use super::{Recipe, RecipeConfig, DEFAULT_MIN_GAS_LIMIT};
use crate::{
    errors::RecipeError,
    steps::{NFTFilter, Step, StepInput, TransferNFTStep},
};

/// Unshields an ERC721 and sends it to a public address.
#[derive(Debug, Clone)]
pub struct TransferNFTRecipe {
    config: RecipeConfig,
    network_configs: NetworkConfigs,
    destination: Address,
    nft: NFTFilter,
}

impl TransferNFTRecipe {
    pub fn new(network_configs: NetworkConfigs, destination: Address, nft: NFTFilter) -> Self {
        Self {
            config: RecipeConfig::new(
                "Transfer NFT",
                "Transfers an unshielded ERC721 to an external address.",
                DEFAULT_MIN_GAS_LIMIT,
            ),
            network_configs,
            destination,
            nft,
        }
    }
}

#[async_trait]
impl Recipe for TransferNFTRecipe {
    fn config(&self) -> &RecipeConfig {
        &self.config
    }

    fn network_configs(&self) -> &NetworkConfigs {
        &self.network_configs
    }

    fn supports_network(&self, network: NetworkName) -> bool {
        self.network_configs.supports(network)
    }

    async fn get_internal_steps(
        &self,
        first_internal_input: &StepInput,
    ) -> Result<Vec<Box<dyn Step>>, RecipeError> {
        // Unshielded NFTs are held by the relay adapt contract.
        let relay_adapt = self
            .network_configs
            .get(first_internal_input.network)?
            .relay_adapt;

        let transfer = TransferNFTStep::new(relay_adapt, self.destination, self.nft.clone());
        Ok(vec![Box::new(transfer) as Box<dyn Step>])
    }
}
