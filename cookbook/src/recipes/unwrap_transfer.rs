use alloy_primitives::Address;
use async_trait::async_trait;
use cookbook_common::{config::NetworkConfigs, models::NetworkName};
use num_bigint::BigUint;

use super::{Recipe, RecipeConfig, DEFAULT_MIN_GAS_LIMIT};
use crate::{
    errors::RecipeError,
    steps::{Step, StepInput, TransferBaseTokenStep, UnwrapBaseTokenStep},
};

/// Unwraps the network's wrapped base token and sends the base token to a public address.
#[derive(Debug, Clone)]
pub struct UnwrapTransferBaseTokenRecipe {
    config: RecipeConfig,
    network_configs: NetworkConfigs,
    destination: Address,
    amount: Option<BigUint>,
}

impl UnwrapTransferBaseTokenRecipe {
    /// Without `amount` the whole wrapped balance is unwrapped and sent.
    pub fn new(
        network_configs: NetworkConfigs,
        destination: Address,
        amount: Option<BigUint>,
    ) -> Self {
        Self {
            config: RecipeConfig::new(
                "Unwrap Transfer Base Token",
                "Unwraps wrapped base token and transfers base token to an external address.",
                DEFAULT_MIN_GAS_LIMIT,
            ),
            network_configs,
            destination,
            amount,
        }
    }
}

#[async_trait]
impl Recipe for UnwrapTransferBaseTokenRecipe {
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
        let wrapped = self
            .network_configs
            .get(first_internal_input.network)?
            .wrapped_base_token();

        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(UnwrapBaseTokenStep::new(wrapped, self.amount.clone())) as Box<dyn Step>,
            Box::new(TransferBaseTokenStep::new(self.destination, self.amount.clone())),
        ];
        Ok(steps)
    }
}
