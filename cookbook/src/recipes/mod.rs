//! Recipe execution engine.
//!
//! A recipe is an ordered list of steps bracketed by the RAILGUN boundary: balances are
//! unshielded first, go through the recipe's own steps, and whatever remains is shielded
//! back. Each step's output records are the next step's input. The collected step outputs
//! are then reduced into one [`RecipeOutput`].

pub mod empty;
pub mod swap;
pub mod transfer_nft;
pub mod unwrap_transfer;

use async_trait::async_trait;
use cookbook_common::{
    config::NetworkConfigs,
    models::{
        normalize_recipient, ContractCall, ERC20Amount, ERC20AmountRecipient, ERC20Info,
        NFTAmount, NetworkName, StepOutputERC20Amount, StepOutputNFT,
    },
};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, info, instrument};

pub use self::{
    empty::EmptyRecipe,
    swap::{SwapBuySellAmounts, SwapRecipe},
    transfer_nft::TransferNFTRecipe,
    unwrap_transfer::UnwrapTransferBaseTokenRecipe,
};
use crate::{
    errors::RecipeError,
    steps::{ShieldDefaultStep, Step, StepInput, StepOutput, UnshieldDefaultStep},
};

/// Gas floor for any recipe transaction.
pub const DEFAULT_MIN_GAS_LIMIT: u64 = 2_800_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub name: String,
    pub description: String,
    pub min_gas_limit: u64,
}

impl RecipeConfig {
    pub fn new(name: &str, description: &str, min_gas_limit: u64) -> Self {
        Self { name: name.to_string(), description: description.to_string(), min_gas_limit }
    }
}

/// Where the product of a recipe ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DestinationKind {
    /// Shielded back into a RAILGUN wallet.
    Shield,
    /// Sent to a public address.
    Transfer,
}

impl DestinationKind {
    fn gas_overhead(&self) -> u64 {
        match self {
            DestinationKind::Shield => 0,
            DestinationKind::Transfer => 100_000,
        }
    }
}

/// Derives the configuration of a recipe variant from its base configuration.
pub fn derive_config(base: &RecipeConfig, destination: DestinationKind) -> RecipeConfig {
    RecipeConfig {
        name: format!("{} + {}", base.name, destination),
        description: base.description.clone(),
        min_gas_limit: base.min_gas_limit + destination.gas_overhead(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub network: NetworkName,
    pub erc20_amounts: Vec<ERC20Amount>,
    pub nfts: Vec<NFTAmount>,
}

impl RecipeInput {
    pub fn new(
        network: NetworkName,
        erc20_amounts: Vec<ERC20Amount>,
        nfts: Vec<NFTAmount>,
    ) -> Self {
        Self { network, erc20_amounts, nfts }
    }

    /// First step input: every amount becomes a record with identical expected and minimum
    /// balances and no spender.
    fn into_step_input(self) -> StepInput {
        StepInput::new(
            self.network,
            self.erc20_amounts
                .into_iter()
                .map(StepOutputERC20Amount::from)
                .collect(),
            self.nfts
                .into_iter()
                .map(StepOutputNFT::from)
                .collect(),
        )
    }
}

/// A balance left at the end of a recipe. `recipient: None` means the balance goes back to
/// the wallet running the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputERC20AmountRecipient {
    #[serde(flatten)]
    pub info: ERC20Info,
    pub expected_balance: BigUint,
    pub min_balance: BigUint,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNFTRecipient {
    #[serde(flatten)]
    pub nft: NFTAmount,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOutput {
    pub name: String,
    pub step_outputs: Vec<StepOutput>,
    pub cross_contract_calls: Vec<ContractCall>,
    pub fee_erc20_amount_recipients: Vec<ERC20AmountRecipient>,
    pub erc20_amount_recipients: Vec<OutputERC20AmountRecipient>,
    pub nft_recipients: Vec<OutputNFTRecipient>,
    pub min_gas_limit: u64,
    pub has_non_deterministic_output: bool,
}

#[async_trait]
pub trait Recipe: Send + Sync {
    fn config(&self) -> &RecipeConfig;

    fn network_configs(&self) -> &NetworkConfigs;

    fn supports_network(&self, network: NetworkName) -> bool;

    /// Steps run between the unshield and the shield. `first_internal_input` is the
    /// unshield step's output, so quotes can be sized on the balance actually available.
    async fn get_internal_steps(
        &self,
        first_internal_input: &StepInput,
    ) -> Result<Vec<Box<dyn Step>>, RecipeError>;

    /// Runs every step of the recipe on `input` and aggregates their outputs.
    ///
    /// Fails on the first invalid step; no partial output is returned.
    #[instrument(skip_all, fields(network = %input.network))]
    async fn get_recipe_output(&self, input: RecipeInput) -> Result<RecipeOutput, RecipeError> {
        let network = input.network;
        let config = self.config();
        let network_config = match self.network_configs().get(network) {
            Ok(network_config) if self.supports_network(network) => network_config,
            _ => {
                return Err(RecipeError::UnsupportedNetwork {
                    recipe: config.name.clone(),
                    network,
                })
            }
        };

        let unshield = UnshieldDefaultStep::new(network_config.unshield_fee_bps);
        let unshield_output = unshield
            .get_valid_step_output(input.into_step_input())
            .await?;

        let mut next_input = StepInput::from_output(network, &unshield_output);
        let mut steps = self
            .get_internal_steps(&next_input)
            .await?;
        steps.push(Box::new(ShieldDefaultStep::new(network_config.shield_fee_bps)));

        let mut step_outputs = Vec::with_capacity(steps.len() + 1);
        step_outputs.push(unshield_output);
        for step in &steps {
            debug!(recipe = %config.name, step = %step.config().name, "Running step");
            let output = step
                .get_valid_step_output(next_input)
                .await?;
            next_input = StepInput::from_output(network, &output);
            step_outputs.push(output);
        }

        let output = reduce_step_outputs(config, step_outputs);
        info!(
            recipe = %output.name,
            steps = output.step_outputs.len(),
            calls = output.cross_contract_calls.len(),
            "Built recipe output"
        );
        Ok(output)
    }
}

/// Aggregates the ordered step outputs of a recipe run.
fn reduce_step_outputs(config: &RecipeConfig, step_outputs: Vec<StepOutput>) -> RecipeOutput {
    let cross_contract_calls = step_outputs
        .iter()
        .flat_map(|output| output.cross_contract_calls.iter().cloned())
        .collect();
    let fee_erc20_amount_recipients = step_outputs
        .iter()
        .flat_map(|output| {
            output
                .fee_erc20_amount_recipients
                .iter()
                .cloned()
        })
        .collect();
    let has_non_deterministic_output = step_outputs
        .iter()
        .any(|output| output.has_non_deterministic_output);

    let (erc20_amount_recipients, nft_recipients) = match step_outputs.last() {
        Some(last) => (
            last.output_erc20_amounts
                .iter()
                .map(|record| OutputERC20AmountRecipient {
                    info: record.info(),
                    expected_balance: record.expected_balance.clone(),
                    min_balance: record.min_balance.clone(),
                    recipient: record
                        .recipient
                        .as_deref()
                        .map(normalize_recipient),
                })
                .collect(),
            last.output_nfts
                .iter()
                .map(|record| OutputNFTRecipient {
                    nft: record.nft.clone(),
                    recipient: record
                        .recipient
                        .as_deref()
                        .map(normalize_recipient),
                })
                .collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    RecipeOutput {
        name: config.name.clone(),
        step_outputs,
        cross_contract_calls,
        fee_erc20_amount_recipients,
        erc20_amount_recipients,
        nft_recipients,
        min_gas_limit: config.min_gas_limit,
        has_non_deterministic_output,
    }
}
