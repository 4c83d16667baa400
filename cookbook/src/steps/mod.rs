//! Steps: the unit of transformation of a recipe.
//!
//! A step receives the resource records produced by the previous step, picks the ones it is
//! entitled to consume, and returns the contract calls it needs plus the full set of records
//! handed to the next step: transformed records first, untouched ones after.
//!
//! Implementations only provide [`Step::get_step_output`]; callers go through
//! [`Step::get_valid_step_output`], which stamps the step's static configuration on the
//! output and checks the balance invariants.

pub mod approve;
pub mod railgun;
pub mod selection;
pub mod swap;
pub mod transfer;
pub mod wrap;

use std::fmt;

use async_trait::async_trait;
use cookbook_common::models::{
    ContractCall, ERC20AmountRecipient, NFTAmountRecipient, NetworkName, StepOutputERC20Amount,
    StepOutputNFT,
};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::debug;

pub use self::{
    approve::ApproveERC20SpenderStep,
    railgun::{DesignateShieldERC20RecipientStep, ShieldDefaultStep, UnshieldDefaultStep},
    selection::{ERC20Filter, ERC20Selection, NFTFilter, SpenderRequirement},
    swap::SwapStep,
    transfer::{
        EmptyTransferBaseTokenStep, TransferBaseTokenStep, TransferERC20Step, TransferNFTStep,
    },
    wrap::{UnwrapBaseTokenStep, WrapBaseTokenStep},
};
use crate::errors::StepError;

/// Stable marker a step puts on its output, so readers of a recipe output can find a step
/// without relying on its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum StepRole {
    Unshield,
    Approve,
    Swap,
    Transfer,
    Wrap,
    Unwrap,
    Designate,
    Shield,
    Noop,
}

/// Static description of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub name: String,
    pub description: String,
    pub role: StepRole,
    /// Set for steps whose amounts come from a quote or exchange rate. Downstream consumers
    /// should then rely on `min_balance` only.
    pub has_non_deterministic_output: bool,
}

impl StepConfig {
    pub fn new(name: &str, description: &str, role: StepRole) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            role,
            has_non_deterministic_output: false,
        }
    }

    pub fn non_deterministic(self) -> Self {
        Self { has_non_deterministic_output: true, ..self }
    }

    pub fn invalid(&self, reason: impl Into<String>) -> StepError {
        StepError::invalid(&self.name, reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    pub network: NetworkName,
    pub erc20_amounts: Vec<StepOutputERC20Amount>,
    pub nfts: Vec<StepOutputNFT>,
}

impl StepInput {
    pub fn new(
        network: NetworkName,
        erc20_amounts: Vec<StepOutputERC20Amount>,
        nfts: Vec<StepOutputNFT>,
    ) -> Self {
        Self { network, erc20_amounts, nfts }
    }

    /// Input of the step following the one that produced `output`.
    pub fn from_output(network: NetworkName, output: &StepOutput) -> Self {
        Self {
            network,
            erc20_amounts: output.output_erc20_amounts.clone(),
            nfts: output.output_nfts.clone(),
        }
    }
}

/// What a step implementation returns, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnvalidatedStepOutput {
    pub cross_contract_calls: Vec<ContractCall>,
    pub output_erc20_amounts: Vec<StepOutputERC20Amount>,
    pub output_nfts: Vec<StepOutputNFT>,
    pub fee_erc20_amount_recipients: Vec<ERC20AmountRecipient>,
    pub spent_erc20_amounts: Vec<ERC20AmountRecipient>,
    pub spent_nfts: Vec<NFTAmountRecipient>,
}

impl UnvalidatedStepOutput {
    /// Output that forwards the input unchanged.
    pub fn pass_through(input: StepInput) -> Self {
        Self {
            output_erc20_amounts: input.erc20_amounts,
            output_nfts: input.nfts,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    pub name: String,
    pub description: String,
    pub role: StepRole,
    pub has_non_deterministic_output: bool,
    pub cross_contract_calls: Vec<ContractCall>,
    pub output_erc20_amounts: Vec<StepOutputERC20Amount>,
    pub output_nfts: Vec<StepOutputNFT>,
    pub fee_erc20_amount_recipients: Vec<ERC20AmountRecipient>,
    pub spent_erc20_amounts: Vec<ERC20AmountRecipient>,
    pub spent_nfts: Vec<NFTAmountRecipient>,
}

#[async_trait]
pub trait Step: Send + Sync + fmt::Debug {
    fn config(&self) -> &StepConfig;

    /// Computes the raw output of this step for `input`.
    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError>;

    /// Computes and validates the output of this step for `input`.
    async fn get_valid_step_output(&self, input: StepInput) -> Result<StepOutput, StepError> {
        let output = self.get_step_output(input).await?;
        validate_step_output(self.config(), output)
    }
}

fn validate_step_output(
    config: &StepConfig,
    output: UnvalidatedStepOutput,
) -> Result<StepOutput, StepError> {
    if let Some(record) = output
        .output_erc20_amounts
        .iter()
        .find(|record| record.min_balance > record.expected_balance)
    {
        return Err(config.invalid(format!(
            "Minimum balance {} exceeds expected balance {} for {}.",
            record.min_balance, record.expected_balance, record.token
        )));
    }

    debug!(
        step = %config.name,
        calls = output.cross_contract_calls.len(),
        erc20_outputs = output.output_erc20_amounts.len(),
        nft_outputs = output.output_nfts.len(),
        "Validated step output"
    );

    Ok(StepOutput {
        name: config.name.clone(),
        description: config.description.clone(),
        role: config.role,
        has_non_deterministic_output: config.has_non_deterministic_output,
        cross_contract_calls: output.cross_contract_calls,
        output_erc20_amounts: output.output_erc20_amounts,
        output_nfts: output.output_nfts,
        fee_erc20_amount_recipients: output.fee_erc20_amount_recipients,
        spent_erc20_amounts: output.spent_erc20_amounts,
        spent_nfts: output.spent_nfts,
    })
}
