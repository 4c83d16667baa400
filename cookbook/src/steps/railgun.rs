//! Steps at the RAILGUN boundary: leaving and re-entering the shielded pool.
//!
//! Neither step emits calls of its own; the unshield and shield are performed by the RAILGUN
//! transaction wrapping the recipe. They only account for the protocol fees.

use async_trait::async_trait;
use cookbook_common::{
    fees::amount_after_fee,
    models::{ERC20AmountRecipient, StepOutputERC20Amount},
};

use super::{Step, StepConfig, StepInput, StepRole, UnvalidatedStepOutput};
use crate::errors::StepError;

pub const UNSHIELD_FEE_RECIPIENT: &str = "RAILGUN Unshield Fee";
pub const SHIELD_FEE_RECIPIENT: &str = "RAILGUN Shield Fee";

/// Deducts a basis point fee from every ERC20 record, returning the reduced records and one
/// fee entry per record.
fn deduct_fees(
    records: Vec<StepOutputERC20Amount>,
    fee_bps: u32,
    fee_recipient: &str,
) -> (Vec<StepOutputERC20Amount>, Vec<ERC20AmountRecipient>) {
    records
        .into_iter()
        .map(|record| {
            let (expected_balance, fee) = amount_after_fee(&record.expected_balance, fee_bps);
            let (min_balance, _) = amount_after_fee(&record.min_balance, fee_bps);
            let fee = ERC20AmountRecipient::new(record.info(), fee, fee_recipient);
            (record.with_balances(expected_balance, min_balance), fee)
        })
        .unzip()
}

#[derive(Debug, Clone)]
pub struct UnshieldDefaultStep {
    config: StepConfig,
    unshield_fee_bps: u32,
}

impl UnshieldDefaultStep {
    pub fn new(unshield_fee_bps: u32) -> Self {
        Self {
            config: StepConfig::new(
                "Unshield",
                "Unshield ERC20s and NFTs from private RAILGUN balance.",
                StepRole::Unshield,
            ),
            unshield_fee_bps,
        }
    }
}

#[async_trait]
impl Step for UnshieldDefaultStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let (output_erc20_amounts, fee_erc20_amount_recipients) =
            deduct_fees(input.erc20_amounts, self.unshield_fee_bps, UNSHIELD_FEE_RECIPIENT);

        Ok(UnvalidatedStepOutput {
            output_erc20_amounts,
            output_nfts: input.nfts,
            fee_erc20_amount_recipients,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct ShieldDefaultStep {
    config: StepConfig,
    shield_fee_bps: u32,
}

impl ShieldDefaultStep {
    pub fn new(shield_fee_bps: u32) -> Self {
        Self {
            config: StepConfig::new(
                "Shield",
                "Shield ERC20s and NFTs into private RAILGUN balance.",
                StepRole::Shield,
            ),
            shield_fee_bps,
        }
    }
}

#[async_trait]
impl Step for ShieldDefaultStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        // Approvals don't survive the shield.
        let records = input
            .erc20_amounts
            .into_iter()
            .map(|record| record.with_approved_spender(None))
            .collect();
        let (output_erc20_amounts, fee_erc20_amount_recipients) =
            deduct_fees(records, self.shield_fee_bps, SHIELD_FEE_RECIPIENT);

        Ok(UnvalidatedStepOutput {
            output_erc20_amounts,
            output_nfts: input.nfts,
            fee_erc20_amount_recipients,
            ..Default::default()
        })
    }
}

/// Marks every ERC20 balance for shielding into `recipient`'s RAILGUN wallet. Without a
/// recipient balances go back to the wallet that unshielded them.
#[derive(Debug, Clone)]
pub struct DesignateShieldERC20RecipientStep {
    config: StepConfig,
    recipient: Option<String>,
}

impl DesignateShieldERC20RecipientStep {
    pub fn new(recipient: Option<String>) -> Self {
        Self {
            config: StepConfig::new(
                "Designate Shield ERC20 Recipient",
                "Designates the private RAILGUN address that receives shielded ERC20s.",
                StepRole::Designate,
            ),
            recipient,
        }
    }
}

#[async_trait]
impl Step for DesignateShieldERC20RecipientStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let Some(recipient) = &self.recipient else {
            return Ok(UnvalidatedStepOutput::pass_through(input));
        };

        let output_erc20_amounts = input
            .erc20_amounts
            .into_iter()
            .map(|record| record.with_recipient(Some(recipient.clone())))
            .collect();

        Ok(UnvalidatedStepOutput {
            output_erc20_amounts,
            output_nfts: input.nfts,
            ..Default::default()
        })
    }
}
