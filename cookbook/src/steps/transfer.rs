//! Steps that send value out of the recipe to a public address.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use cookbook_common::{
    contract::{erc20::transfer_call, erc721::safe_transfer_from_call},
    models::{
        normalize_recipient, ContractCall, ERC20AmountRecipient, ERC20Info, NFTAmountRecipient,
        NFTTokenType, TokenKind,
    },
};
use num_bigint::BigUint;

use super::{
    selection::{
        select_erc20_amounts, select_nft, split_guaranteed, ERC20Filter, ERC20Selection,
        GuaranteedAmounts, NFTFilter,
    },
    Step, StepConfig, StepInput, StepRole, UnvalidatedStepOutput,
};
use crate::errors::StepError;

fn recipient_label(to: &Address) -> String {
    normalize_recipient(&to.to_string())
}

#[derive(Debug, Clone)]
pub struct TransferERC20Step {
    config: StepConfig,
    to: Address,
    token: ERC20Info,
    amount: Option<BigUint>,
}

impl TransferERC20Step {
    /// Transfers `amount` of `token` to `to`, or the whole balance when `amount` is `None`.
    ///
    /// Only guaranteed balances are sent. Whatever a balance may hold above its minimum stays
    /// in the recipe and is forwarded.
    pub fn new(to: Address, token: ERC20Info, amount: Option<BigUint>) -> Self {
        Self {
            config: StepConfig::new(
                "Transfer ERC20",
                "Transfers ERC20 token to an external public address.",
                StepRole::Transfer,
            ),
            to,
            token,
            amount,
        }
    }
}

#[async_trait]
impl Step for TransferERC20Step {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let token_address = self
            .token
            .token
            .contract_address()
            .ok_or_else(|| self.config.invalid("Use the base token transfer step instead."))?;

        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &ERC20Filter::token(self.token.token),
                self.amount.as_ref(),
            )?;

        let GuaranteedAmounts { guaranteed, surplus, .. } =
            split_guaranteed(erc20_amounts_for_step);

        let mut cross_contract_calls = Vec::with_capacity(guaranteed.len());
        let mut spent_erc20_amounts = Vec::with_capacity(guaranteed.len());
        for record in guaranteed {
            cross_contract_calls.push(
                transfer_call(token_address, self.to, &record.min_balance)
                    .map_err(|e| StepError::encoding(&self.config.name, e))?,
            );
            spent_erc20_amounts.push(ERC20AmountRecipient::new(
                record.info(),
                record.min_balance,
                recipient_label(&self.to),
            ));
        }

        Ok(UnvalidatedStepOutput {
            cross_contract_calls,
            output_erc20_amounts: surplus
                .into_iter()
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            spent_erc20_amounts,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct TransferBaseTokenStep {
    config: StepConfig,
    to: Address,
    amount: Option<BigUint>,
}

impl TransferBaseTokenStep {
    pub fn new(to: Address, amount: Option<BigUint>) -> Self {
        Self {
            config: StepConfig::new(
                "Transfer Base Token",
                "Transfers base token to an external public address.",
                StepRole::Transfer,
            ),
            to,
            amount,
        }
    }
}

#[async_trait]
impl Step for TransferBaseTokenStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &ERC20Filter::token(TokenKind::Native),
                self.amount.as_ref(),
            )?;

        let GuaranteedAmounts { guaranteed, surplus, .. } =
            split_guaranteed(erc20_amounts_for_step);

        let (cross_contract_calls, spent_erc20_amounts) = guaranteed
            .into_iter()
            .map(|record| {
                let call = ContractCall::new(self.to, Bytes::new(), record.min_balance.clone());
                let spent = ERC20AmountRecipient::new(
                    record.info(),
                    record.min_balance,
                    recipient_label(&self.to),
                );
                (call, spent)
            })
            .unzip();

        Ok(UnvalidatedStepOutput {
            cross_contract_calls,
            output_erc20_amounts: surplus
                .into_iter()
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            spent_erc20_amounts,
            ..Default::default()
        })
    }
}

/// Sends nothing to the zero address. Useful to exercise a recipe end to end.
#[derive(Debug, Clone)]
pub struct EmptyTransferBaseTokenStep {
    config: StepConfig,
}

impl EmptyTransferBaseTokenStep {
    pub fn new() -> Self {
        Self {
            config: StepConfig::new(
                "Empty Transfer Base Token",
                "Sends 0 base token to the null address.",
                StepRole::Noop,
            ),
        }
    }
}

impl Default for EmptyTransferBaseTokenStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Step for EmptyTransferBaseTokenStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![ContractCall::new(
                Address::ZERO,
                Bytes::new(),
                BigUint::default(),
            )],
            ..UnvalidatedStepOutput::pass_through(input)
        })
    }
}

/// Transfers one ERC721 held by the relay adapt contract to a public address.
#[derive(Debug, Clone)]
pub struct TransferNFTStep {
    config: StepConfig,
    from: Address,
    to: Address,
    filter: NFTFilter,
}

impl TransferNFTStep {
    pub fn new(from: Address, to: Address, filter: NFTFilter) -> Self {
        Self {
            config: StepConfig::new(
                "Transfer NFT",
                "Transfers an ERC721 NFT to an external public address.",
                StepRole::Transfer,
            ),
            from,
            to,
            filter,
        }
    }
}

#[async_trait]
impl Step for TransferNFTStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        if self.filter.nft_token_type != NFTTokenType::ERC721 {
            return Err(self.config.invalid("Only ERC721 transfers are supported."));
        }

        let (nft_for_step, unused_nfts) = select_nft(&self.config, input.nfts, &self.filter)?;

        let call = safe_transfer_from_call(&nft_for_step.nft, self.from, self.to)
            .map_err(|e| StepError::encoding(&self.config.name, e))?;

        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![call],
            output_erc20_amounts: input.erc20_amounts,
            output_nfts: unused_nfts,
            spent_nfts: vec![NFTAmountRecipient {
                nft: nft_for_step.nft,
                recipient: recipient_label(&self.to),
            }],
            ..Default::default()
        })
    }
}
