use async_trait::async_trait;
use cookbook_common::models::{
    ContractCall, ERC20AmountRecipient, StepOutputERC20Amount, SwapQuoteData, TokenKind,
};

use super::{
    selection::{
        select_erc20_amounts, split_guaranteed, ERC20Filter, ERC20Selection, GuaranteedAmounts,
    },
    Step, StepConfig, StepInput, StepRole, UnvalidatedStepOutput,
};
use crate::errors::StepError;

/// Executes a quoted swap.
///
/// Consumes exactly the quote's sell amount, possibly spread over several balances, which must
/// have been approved for the quote's spender unless the base token is sold. The bought
/// balance is only known up to slippage: it is forwarded first, with the quoted amount as
/// expected balance and the quote's minimum as minimum balance.
#[derive(Debug, Clone)]
pub struct SwapStep {
    config: StepConfig,
    quote: SwapQuoteData,
    exchange_name: String,
}

impl SwapStep {
    pub fn new(quote: SwapQuoteData, exchange_name: impl Into<String>) -> Self {
        let exchange_name = exchange_name.into();
        Self {
            config: StepConfig::new(
                &format!("{exchange_name} Swap"),
                "Swaps an ERC20 token using a quoted exchange route.",
                StepRole::Swap,
            )
            .non_deterministic(),
            quote,
            exchange_name,
        }
    }

    fn sell_filter(&self) -> Result<ERC20Filter, StepError> {
        match (self.quote.sell.token, self.quote.spender) {
            (TokenKind::Native, _) => Ok(ERC20Filter::token(TokenKind::Native)),
            (token @ TokenKind::Contract(_), Some(spender)) => {
                Ok(ERC20Filter::approved(token, spender))
            }
            (TokenKind::Contract(_), None) => {
                Err(self.config.invalid("Quote has no spender for sell token."))
            }
        }
    }
}

#[async_trait]
impl Step for SwapStep {
    fn config(&self) -> &StepConfig {
        &self.config
    }

    async fn get_step_output(&self, input: StepInput) -> Result<UnvalidatedStepOutput, StepError> {
        let quote = &self.quote;
        if quote.minimum_buy_amount > quote.buy_erc20_amount.amount {
            return Err(self.config.invalid(format!(
                "Minimum buy amount {} exceeds quoted buy amount {}.",
                quote.minimum_buy_amount, quote.buy_erc20_amount.amount
            )));
        }

        let ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts } =
            select_erc20_amounts(
                &self.config,
                input.erc20_amounts,
                &self.sell_filter()?,
                Some(&quote.sell_token_value),
            )?;
        // Only the guaranteed part of each balance is sold.
        let GuaranteedAmounts { total: sold_amount, surplus, .. } =
            split_guaranteed(erc20_amounts_for_step);

        let call = ContractCall::try_from(quote.cross_contract_call.clone())
            .map_err(|e| StepError::malformed_call(&self.config.name, e))?;

        let bought = StepOutputERC20Amount {
            min_balance: quote.minimum_buy_amount.clone(),
            ..StepOutputERC20Amount::from(quote.buy_erc20_amount.clone())
        };

        let sold = ERC20AmountRecipient::new(quote.sell, sold_amount, self.exchange_name.clone());

        Ok(UnvalidatedStepOutput {
            cross_contract_calls: vec![call],
            output_erc20_amounts: std::iter::once(bought)
                .chain(surplus)
                .chain(unused_erc20_amounts)
                .collect(),
            output_nfts: input.nfts,
            spent_erc20_amounts: vec![sold],
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use cookbook_common::models::{NetworkName, PopulatedTransaction};
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{erc20_record, spender, swap_quote, token_a, token_b};

    fn input(records: Vec<StepOutputERC20Amount>) -> StepInput {
        StepInput::new(NetworkName::Ethereum, records, vec![])
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_consumes_quoted_amount() {
        let step = SwapStep::new(swap_quote(), "0x Exchange");
        let approved = erc20_record(token_a(), 11970, 11970).with_approved_spender(Some(spender()));

        let output = step
            .get_valid_step_output(input(vec![approved]))
            .await
            .unwrap();

        assert_eq!(output.name, "0x Exchange Swap");
        assert!(output.has_non_deterministic_output);
        assert_eq!(
            output.output_erc20_amounts,
            vec![
                erc20_record(token_b(), 500, 495),
                erc20_record(token_a(), 1970, 1970).with_approved_spender(Some(spender()))
            ]
        );
        assert_eq!(output.spent_erc20_amounts.len(), 1);
        assert_eq!(output.spent_erc20_amounts[0].amount, BigUint::from(10000u32));
        assert_eq!(output.spent_erc20_amounts[0].recipient, "0x Exchange");
        assert_eq!(output.cross_contract_calls.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_across_records() {
        let step = SwapStep::new(swap_quote(), "0x Exchange");
        let approved = |expected, min| {
            erc20_record(token_a(), expected, min).with_approved_spender(Some(spender()))
        };

        let output = step
            .get_valid_step_output(input(vec![approved(6000, 5000), approved(6000, 6000)]))
            .await
            .unwrap();

        assert_eq!(
            output.output_erc20_amounts,
            vec![erc20_record(token_b(), 500, 495), approved(1000, 0), approved(1000, 1000)]
        );
        assert_eq!(output.spent_erc20_amounts[0].amount, BigUint::from(10000u32));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_requires_approval() {
        let step = SwapStep::new(swap_quote(), "0x Exchange");

        let err = step
            .get_valid_step_output(input(vec![erc20_record(token_a(), 11970, 11970)]))
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("0x Exchange Swap step is invalid."));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_insufficient_balance() {
        let step = SwapStep::new(swap_quote(), "0x Exchange");
        let approved = erc20_record(token_a(), 20000, 9999).with_approved_spender(Some(spender()));

        let res = step
            .get_valid_step_output(input(vec![approved]))
            .await;

        assert!(matches!(res, Err(StepError::Invalid { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_malformed_call() {
        let quote = SwapQuoteData {
            cross_contract_call: PopulatedTransaction {
                data: None,
                ..swap_quote().cross_contract_call
            },
            ..swap_quote()
        };
        let step = SwapStep::new(quote, "0x Exchange");
        let approved = erc20_record(token_a(), 11970, 11970).with_approved_spender(Some(spender()));

        let res = step
            .get_valid_step_output(input(vec![approved]))
            .await;

        assert!(matches!(res, Err(StepError::MalformedCall { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_base_token_needs_no_approval() {
        let quote = SwapQuoteData {
            sell: cookbook_common::models::ERC20Info::native(18),
            spender: None,
            ..swap_quote()
        };
        let step = SwapStep::new(quote, "0x Exchange");

        let output = step
            .get_valid_step_output(input(vec![erc20_record(TokenKind::Native, 10000, 10000)]))
            .await
            .unwrap();

        assert_eq!(output.output_erc20_amounts, vec![erc20_record(token_b(), 500, 495)]);
    }
}
