use async_trait::async_trait;
use cookbook_common::{
    contract::weth::{deposit_call, withdraw_call},
    models::{ERC20Info, StepOutputERC20Amount, TokenKind},
};
use num_bigint::BigUint;

use super::{
    selection::{
        select_erc20_amounts, split_guaranteed, ERC20Filter, ERC20Selection, GuaranteedAmounts,
    },
    Step, StepConfig, StepInput, StepRole, UnvalidatedStepOutput,
};
use crate::errors::StepError;

/// Converts between the base token and its wrapped ERC20 at a 1:1 rate.
///
/// Both directions convert the guaranteed total of the selected balances into one record.
#[derive(Debug, Clone)]
pub struct WrapBaseTokenStep {
    config: StepConfig,
    wrapped_token: ERC20Info,
    amount: Option<BigUint>,
}

impl WrapBaseTokenStep {
    pub fn new(wrapped_token: ERC20Info, amount: Option<BigUint>) -> Self {
        Self {
            config: StepConfig::new(
                "Wrap Base Token",
                "Wraps base token into wrapped token, ie ETH to WETH.",
                StepRole::Wrap,
            ),
            wrapped_token,
            amount,
        }
    }
}

#[async_trait]
impl Step for WrapBaseTokenStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let wrapped_address = self
            .wrapped_token
            .token
            .contract_address()
            .ok_or_else(|| self.config.invalid("Wrapped token must be a contract."))?;

        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &ERC20Filter::token(TokenKind::Native),
                self.amount.as_ref(),
            )?;
        let GuaranteedAmounts { total, surplus, .. } = split_guaranteed(erc20_amounts_for_step);

        let call = deposit_call(wrapped_address, &total);
        let wrapped = StepOutputERC20Amount::new(self.wrapped_token, total);

        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![call],
            output_erc20_amounts: std::iter::once(wrapped)
                .chain(surplus)
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnwrapBaseTokenStep {
    config: StepConfig,
    wrapped_token: ERC20Info,
    amount: Option<BigUint>,
}

impl UnwrapBaseTokenStep {
    pub fn new(wrapped_token: ERC20Info, amount: Option<BigUint>) -> Self {
        Self {
            config: StepConfig::new(
                "Unwrap Base Token",
                "Unwraps wrapped token into base token, ie WETH to ETH.",
                StepRole::Unwrap,
            ),
            wrapped_token,
            amount,
        }
    }
}

#[async_trait]
impl Step for UnwrapBaseTokenStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let wrapped_address = self
            .wrapped_token
            .token
            .contract_address()
            .ok_or_else(|| self.config.invalid("Wrapped token must be a contract."))?;

        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &ERC20Filter::token(self.wrapped_token.token),
                self.amount.as_ref(),
            )?;
        let GuaranteedAmounts { total, surplus, .. } = split_guaranteed(erc20_amounts_for_step);

        let call = withdraw_call(wrapped_address, &total)
            .map_err(|e| StepError::encoding(&self.config.name, e))?;
        let base = StepOutputERC20Amount::new(
            ERC20Info::native(self.wrapped_token.decimals),
            total,
        );

        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![call],
            output_erc20_amounts: std::iter::once(base)
                .chain(surplus)
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            ..Default::default()
        })
    }
}
