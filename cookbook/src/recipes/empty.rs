use async_trait::async_trait;
use cookbook_common::{config::NetworkConfigs, models::NetworkName};

use super::{Recipe, RecipeConfig, DEFAULT_MIN_GAS_LIMIT};
use crate::{
    errors::RecipeError,
    steps::{DesignateShieldERC20RecipientStep, EmptyTransferBaseTokenStep, Step, StepInput},
};

/// Unshields and reshields without doing anything in between. Exercises the full recipe
/// path, fees included.
#[derive(Debug, Clone)]
pub struct EmptyRecipe {
    config: RecipeConfig,
    network_configs: NetworkConfigs,
    shield_recipient: Option<String>,
}

impl EmptyRecipe {
    pub fn new(network_configs: NetworkConfigs) -> Self {
        Self {
            config: RecipeConfig::new(
                "Empty Recipe",
                "Empty recipe for testing. Sends 0 base token to null address.",
                DEFAULT_MIN_GAS_LIMIT,
            ),
            network_configs,
            shield_recipient: None,
        }
    }

    /// Shields the remaining balances into `recipient` instead of the unshielding wallet.
    pub fn with_shield_recipient(self, recipient: impl Into<String>) -> Self {
        Self { shield_recipient: Some(recipient.into()), ..self }
    }
}

#[async_trait]
impl Recipe for EmptyRecipe {
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
        _first_internal_input: &StepInput,
    ) -> Result<Vec<Box<dyn Step>>, RecipeError> {
        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(EmptyTransferBaseTokenStep::new()) as Box<dyn Step>,
            Box::new(DesignateShieldERC20RecipientStep::new(self.shield_recipient.clone())),
        ];
        Ok(steps)
    }
}
