use alloy_primitives::Address;
use async_trait::async_trait;
use cookbook_common::{contract::erc20::approve_call, models::ERC20Info};
use num_bigint::BigUint;

use super::{
    selection::{select_erc20_amounts, ERC20Filter, ERC20Selection},
    Step, StepConfig, StepInput, StepRole, UnvalidatedStepOutput,
};
use crate::errors::StepError;

/// Approves `spender` to move a balance of `token`, e.g. ahead of a swap.
///
/// One approval covers every selected balance, each forwarded with its approved spender set.
/// Balances above `amount` are split off and forwarded unapproved.
#[derive(Debug, Clone)]
pub struct ApproveERC20SpenderStep {
    config: StepConfig,
    spender: Address,
    token: ERC20Info,
    amount: Option<BigUint>,
}

impl ApproveERC20SpenderStep {
    pub fn new(spender: Address, token: ERC20Info, amount: Option<BigUint>) -> Self {
        Self {
            config: StepConfig::new(
                "Approve ERC20 Spender",
                "Approves ERC20 for spender contract.",
                StepRole::Approve,
            ),
            spender,
            token,
            amount,
        }
    }
}

#[async_trait]
impl Step for ApproveERC20SpenderStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let token_address = self
            .token
            .token
            .contract_address()
            .ok_or_else(|| self.config.invalid("Base token can't be approved."))?;

        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &ERC20Filter::token(self.token.token),
                self.amount.as_ref(),
            )?;

        let approval: BigUint = erc20_amounts_for_step
            .iter()
            .map(|record| &record.expected_balance)
            .sum();
        let call = approve_call(token_address, self.spender, &approval)
            .map_err(|e| StepError::encoding(&self.config.name, e))?;

        let approved = erc20_amounts_for_step
            .into_iter()
            .map(|record| record.with_approved_spender(Some(self.spender)));

        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![call],
            output_erc20_amounts: approved
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            ..Default::default()
        })
    }
}
