//! Swap recipe: unshield, swap through a quoted route, then shield or send the product.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use cookbook_common::{
    config::NetworkConfigs,
    fees::min_amount_after_slippage,
    models::{
        compare_erc20_info, ERC20Info, NetworkName, StepOutputERC20Amount, SwapQuoteData,
        SwapQuoteParams, TokenKind,
    },
    traits::SwapQuoteProvider,
};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{
    derive_config, DestinationKind, Recipe, RecipeConfig, RecipeOutput, DEFAULT_MIN_GAS_LIMIT,
};
use crate::{
    errors::{RecipeError, StepError},
    steps::{
        ApproveERC20SpenderStep, Step, StepInput, StepOutput, StepRole, SwapStep,
        TransferBaseTokenStep, TransferERC20Step,
    },
};

/// Amounts a swap recipe moved, as read back from its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapBuySellAmounts {
    pub sell_unshield_fee: BigUint,
    pub buy_amount: BigUint,
    pub buy_minimum: BigUint,
    pub buy_shield_fee: BigUint,
}

pub struct SwapRecipe {
    config: RecipeConfig,
    network_configs: NetworkConfigs,
    quote_provider: Arc<dyn SwapQuoteProvider>,
    sell_token: ERC20Info,
    buy_token: ERC20Info,
    slippage_bps: u32,
    /// Defaults to the whole unshielded sell token balance.
    sell_amount: Option<BigUint>,
    /// Public address receiving the bought token. Without one it's shielded back.
    destination: Option<Address>,
    quote: RwLock<Option<SwapQuoteData>>,
}

impl SwapRecipe {
    pub fn new(
        quote_provider: Arc<dyn SwapQuoteProvider>,
        network_configs: NetworkConfigs,
        sell_token: ERC20Info,
        buy_token: ERC20Info,
        slippage_bps: u32,
        destination: Option<Address>,
    ) -> Self {
        let base = RecipeConfig::new(
            &format!("{} Swap", quote_provider.exchange_name()),
            "Swaps two ERC20 tokens using a DEX aggregator.",
            DEFAULT_MIN_GAS_LIMIT,
        );
        let destination_kind = match destination {
            Some(_) => DestinationKind::Transfer,
            None => DestinationKind::Shield,
        };
        Self {
            config: derive_config(&base, destination_kind),
            network_configs,
            quote_provider,
            sell_token,
            buy_token,
            slippage_bps,
            sell_amount: None,
            destination,
            quote: RwLock::new(None),
        }
    }

    pub fn with_sell_amount(self, sell_amount: BigUint) -> Self {
        Self { sell_amount: Some(sell_amount), ..self }
    }

    /// The quote fetched by the last run, if any.
    pub async fn last_quote(&self) -> Option<SwapQuoteData> {
        self.quote.read().await.clone()
    }

    fn sell_amount_for(&self, input: &StepInput) -> BigUint {
        match &self.sell_amount {
            Some(amount) => amount.clone(),
            None => input
                .erc20_amounts
                .iter()
                .filter(|record| record.token == self.sell_token.token)
                .map(|record| &record.min_balance)
                .sum(),
        }
    }

    /// Sends the swap's product to `destination`. The swap forwards its bought balance ahead
    /// of every other one, so capping the transfer at the guaranteed buy amount leaves buy
    /// token balances the swap didn't produce to the shield.
    fn buy_transfer_step(&self, destination: Address, quote: &SwapQuoteData) -> Box<dyn Step> {
        let amount = Some(quote.minimum_buy_amount.clone());
        match self.buy_token.token {
            TokenKind::Native => Box::new(TransferBaseTokenStep::new(destination, amount)),
            TokenKind::Contract(_) => {
                Box::new(TransferERC20Step::new(destination, self.buy_token, amount))
            }
        }
    }

    /// Reads back the swapped amounts and their RAILGUN fees from an output of this recipe.
    ///
    /// Best effort: returns `None` when the output doesn't have the expected shape.
    pub fn get_buy_sell_amounts_from_recipe_output(
        &self,
        output: &RecipeOutput,
    ) -> Option<SwapBuySellAmounts> {
        match self.extract_buy_sell_amounts(output) {
            Ok(amounts) => Some(amounts),
            Err(reason) => {
                warn!(recipe = %self.config.name, %reason, "Failed to extract swap amounts");
                None
            }
        }
    }

    fn extract_buy_sell_amounts(
        &self,
        output: &RecipeOutput,
    ) -> Result<SwapBuySellAmounts, String> {
        let buy_token = self.buy_token.token;

        let unshield = find_step(output, StepRole::Unshield)?;
        let sell_fees: Vec<_> = unshield
            .fee_erc20_amount_recipients
            .iter()
            .filter(|fee| compare_erc20_info(&fee.info, &self.sell_token))
            .collect();
        if sell_fees.is_empty() {
            return Err(format!("no unshield fee for {}", self.sell_token.token));
        }
        let sell_unshield_fee: BigUint = sell_fees
            .into_iter()
            .map(|fee| &fee.amount)
            .sum();

        let swap = find_step(output, StepRole::Swap)?;
        if self.destination.is_some() {
            let bought = find_record(swap, buy_token)?;
            return Ok(SwapBuySellAmounts {
                sell_unshield_fee,
                buy_amount: bought.expected_balance.clone(),
                buy_minimum: bought.min_balance.clone(),
                buy_shield_fee: BigUint::zero(),
            });
        }

        let shield = find_step(output, StepRole::Shield)?;
        let shielded = find_record(shield, buy_token)?;
        let buy_shield_fee = shield
            .fee_erc20_amount_recipients
            .iter()
            .find(|fee| compare_erc20_info(&fee.info, &self.buy_token))
            .map(|fee| fee.amount.clone())
            .ok_or_else(|| format!("no shield fee for {buy_token}"))?;

        Ok(SwapBuySellAmounts {
            sell_unshield_fee,
            buy_amount: shielded.expected_balance.clone(),
            buy_minimum: shielded.min_balance.clone(),
            buy_shield_fee,
        })
    }
}

fn find_step(output: &RecipeOutput, role: StepRole) -> Result<&StepOutput, String> {
    output
        .step_outputs
        .iter()
        .rfind(|step| step.role == role)
        .ok_or_else(|| format!("no {role} step in output"))
}

fn find_record(step: &StepOutput, token: TokenKind) -> Result<&StepOutputERC20Amount, String> {
    step.output_erc20_amounts
        .iter()
        .find(|record| record.token == token)
        .ok_or_else(|| format!("no {token} output in {} step", step.name))
}

#[async_trait]
impl Recipe for SwapRecipe {
    fn config(&self) -> &RecipeConfig {
        &self.config
    }

    fn network_configs(&self) -> &NetworkConfigs {
        &self.network_configs
    }

    fn supports_network(&self, network: NetworkName) -> bool {
        self.quote_provider
            .supports_network(network)
    }

    async fn get_internal_steps(
        &self,
        first_internal_input: &StepInput,
    ) -> Result<Vec<Box<dyn Step>>, RecipeError> {
        let network = first_internal_input.network;
        let sell_amount = self.sell_amount_for(first_internal_input);
        if sell_amount.is_zero() {
            return Err(StepError::invalid(
                &self.config.name,
                format!("No {} balance to sell.", self.sell_token.token),
            )
            .into());
        }

        let params = SwapQuoteParams {
            network,
            sell: self.sell_token,
            buy: self.buy_token,
            sell_amount,
            slippage_bps: self.slippage_bps,
            taker: self.network_configs.get(network)?.relay_adapt,
        };
        let quote = self
            .quote_provider
            .get_swap_quote(params)
            .await?;
        debug!(
            recipe = %self.config.name,
            sell = %quote.sell_token_value,
            buy = %quote.buy_erc20_amount.amount,
            minimum_buy = %quote.minimum_buy_amount,
            "Fetched swap quote"
        );
        let slippage_floor =
            min_amount_after_slippage(&quote.buy_erc20_amount.amount, self.slippage_bps);
        if quote.minimum_buy_amount < slippage_floor {
            return Err(StepError::invalid(
                &self.config.name,
                format!(
                    "Quoted minimum buy amount {} is below the {} bps slippage floor {}.",
                    quote.minimum_buy_amount, self.slippage_bps, slippage_floor
                ),
            )
            .into());
        }
        *self.quote.write().await = Some(quote.clone());

        let mut steps: Vec<Box<dyn Step>> = Vec::with_capacity(3);
        if let (TokenKind::Contract(_), Some(spender)) = (quote.sell.token, quote.spender) {
            steps.push(Box::new(ApproveERC20SpenderStep::new(
                spender,
                quote.sell,
                Some(quote.sell_token_value.clone()),
            )));
        }
        let transfer = self
            .destination
            .map(|destination| self.buy_transfer_step(destination, &quote));
        steps.push(Box::new(SwapStep::new(quote, self.quote_provider.exchange_name())));
        steps.extend(transfer);
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use cookbook_common::{
        models::{ERC20Amount, ERC20AmountRecipient},
        traits::{MockSwapQuoteProvider, QuoteError},
    };
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        recipes::{OutputERC20AmountRecipient, RecipeInput},
        steps::railgun::{SHIELD_FEE_RECIPIENT, UNSHIELD_FEE_RECIPIENT},
        testing::{destination, spender, swap_quote, token_a, token_b},
    };

    fn sell() -> ERC20Info {
        ERC20Info::new(token_a(), 18)
    }

    fn buy() -> ERC20Info {
        ERC20Info::new(token_b(), 18)
    }

    fn input() -> RecipeInput {
        RecipeInput::new(
            NetworkName::Ethereum,
            vec![ERC20Amount::new(sell(), BigUint::from(12000u32))],
            vec![],
        )
    }

    fn provider(quote: SwapQuoteData, expected_sell_amount: u64) -> MockSwapQuoteProvider {
        let mut provider = MockSwapQuoteProvider::new();
        provider
            .expect_exchange_name()
            .return_const("0x Exchange".to_string());
        provider
            .expect_supports_network()
            .return_const(true);
        let relay_adapt = NetworkConfigs::default()
            .get(NetworkName::Ethereum)
            .unwrap()
            .relay_adapt;
        provider
            .expect_get_swap_quote()
            .with(eq(SwapQuoteParams {
                network: NetworkName::Ethereum,
                sell: sell(),
                buy: buy(),
                sell_amount: BigUint::from(expected_sell_amount),
                slippage_bps: 100,
                taker: relay_adapt,
            }))
            .times(1)
            .return_once(move |_| Ok(quote));
        provider
    }

    fn recipe(provider: MockSwapQuoteProvider, destination: Option<Address>) -> SwapRecipe {
        SwapRecipe::new(
            Arc::new(provider),
            NetworkConfigs::default(),
            sell(),
            buy(),
            100,
            destination,
        )
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_to_public_destination() {
        let recipe = recipe(provider(swap_quote(), 10000), Some(destination()))
            .with_sell_amount(BigUint::from(10000u32));

        let output = recipe
            .get_recipe_output(input())
            .await
            .unwrap();

        assert_eq!(output.name, "0x Exchange Swap + Transfer");
        let roles: Vec<_> = output
            .step_outputs
            .iter()
            .map(|step| step.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                StepRole::Unshield,
                StepRole::Approve,
                StepRole::Swap,
                StepRole::Transfer,
                StepRole::Shield
            ]
        );

        let swap = &output.step_outputs[2];
        assert_eq!(
            swap.output_erc20_amounts
                .iter()
                .map(|r| (r.token, r.expected_balance.clone(), r.min_balance.clone()))
                .collect::<Vec<_>>(),
            vec![
                (token_b(), BigUint::from(500u32), BigUint::from(495u32)),
                (token_a(), BigUint::from(1970u32), BigUint::from(1970u32))
            ]
        );
        // Only the guaranteed 495 leaves; a fill above the minimum is shielded back.
        let transfer = &output.step_outputs[3];
        assert_eq!(
            transfer.spent_erc20_amounts,
            vec![ERC20AmountRecipient::new(
                buy(),
                BigUint::from(495u32),
                destination()
                    .to_string()
                    .to_lowercase()
            )]
        );
        assert_eq!(
            output.fee_erc20_amount_recipients,
            vec![
                ERC20AmountRecipient::new(sell(), BigUint::from(30u32), UNSHIELD_FEE_RECIPIENT),
                ERC20AmountRecipient::new(buy(), BigUint::zero(), SHIELD_FEE_RECIPIENT),
                ERC20AmountRecipient::new(sell(), BigUint::from(4u32), SHIELD_FEE_RECIPIENT),
            ]
        );
        assert_eq!(
            output.erc20_amount_recipients,
            vec![
                OutputERC20AmountRecipient {
                    info: buy(),
                    expected_balance: BigUint::from(5u32),
                    min_balance: BigUint::zero(),
                    recipient: None,
                },
                OutputERC20AmountRecipient {
                    info: sell(),
                    expected_balance: BigUint::from(1966u32),
                    min_balance: BigUint::from(1966u32),
                    recipient: None,
                }
            ]
        );
        assert_eq!(output.cross_contract_calls.len(), 3);
        assert!(output.has_non_deterministic_output);

        assert_eq!(
            recipe.get_buy_sell_amounts_from_recipe_output(&output),
            Some(SwapBuySellAmounts {
                sell_unshield_fee: BigUint::from(30u32),
                buy_amount: BigUint::from(500u32),
                buy_minimum: BigUint::from(495u32),
                buy_shield_fee: BigUint::zero(),
            })
        );
        assert_eq!(recipe.last_quote().await, Some(swap_quote()));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_and_shield() {
        let recipe = recipe(provider(swap_quote(), 11970), None);

        let output = recipe
            .get_recipe_output(input())
            .await
            .unwrap();

        assert_eq!(output.name, "0x Exchange Swap + Shield");
        assert_eq!(output.step_outputs.len(), 4);
        assert_eq!(
            recipe.get_buy_sell_amounts_from_recipe_output(&output),
            Some(SwapBuySellAmounts {
                sell_unshield_fee: BigUint::from(30u32),
                buy_amount: BigUint::from(499u32),
                buy_minimum: BigUint::from(494u32),
                buy_shield_fee: BigUint::from(1u32),
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_to_destination_keeps_held_buy_token() {
        let recipe = recipe(provider(swap_quote(), 10000), Some(destination()))
            .with_sell_amount(BigUint::from(10000u32));
        let holding_buy_token = RecipeInput::new(
            NetworkName::Ethereum,
            vec![
                ERC20Amount::new(sell(), BigUint::from(12000u32)),
                ERC20Amount::new(buy(), BigUint::from(1000u32)),
            ],
            vec![],
        );

        let output = recipe
            .get_recipe_output(holding_buy_token)
            .await
            .unwrap();

        let transfer = &output.step_outputs[3];
        assert_eq!(transfer.role, StepRole::Transfer);
        assert_eq!(
            transfer
                .spent_erc20_amounts
                .iter()
                .map(|spent| spent.amount.clone())
                .collect::<Vec<_>>(),
            vec![BigUint::from(495u32)]
        );
        // 998 after the unshield fee, minus 2 shield fee.
        assert_eq!(
            output
                .erc20_amount_recipients
                .iter()
                .map(|r| (r.info.token, r.expected_balance.clone()))
                .collect::<Vec<_>>(),
            vec![
                (token_b(), BigUint::from(5u32)),
                (token_a(), BigUint::from(1966u32)),
                (token_b(), BigUint::from(996u32))
            ]
        );
        assert_eq!(
            recipe
                .get_buy_sell_amounts_from_recipe_output(&output)
                .map(|amounts| amounts.buy_amount),
            Some(BigUint::from(500u32))
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_sell_token_over_several_inputs() {
        let recipe = recipe(provider(swap_quote(), 10000), None)
            .with_sell_amount(BigUint::from(10000u32));
        let split_sell_token = RecipeInput::new(
            NetworkName::Ethereum,
            vec![
                ERC20Amount::new(sell(), BigUint::from(6000u32)),
                ERC20Amount::new(sell(), BigUint::from(6000u32)),
            ],
            vec![],
        );

        let output = recipe
            .get_recipe_output(split_sell_token)
            .await
            .unwrap();

        let approve = &output.step_outputs[1];
        assert_eq!(approve.cross_contract_calls.len(), 1);
        assert_eq!(
            approve
                .output_erc20_amounts
                .iter()
                .map(|r| (r.expected_balance.clone(), r.approved_spender))
                .collect::<Vec<_>>(),
            vec![
                (BigUint::from(5985u32), Some(spender())),
                (BigUint::from(4015u32), Some(spender())),
                (BigUint::from(1970u32), None)
            ]
        );
        assert_eq!(output.step_outputs[2].spent_erc20_amounts[0].amount, BigUint::from(10000u32));
        assert_eq!(
            recipe.get_buy_sell_amounts_from_recipe_output(&output),
            Some(SwapBuySellAmounts {
                sell_unshield_fee: BigUint::from(30u32),
                buy_amount: BigUint::from(499u32),
                buy_minimum: BigUint::from(494u32),
                buy_shield_fee: BigUint::from(1u32),
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_insufficient_balance() {
        let quote = SwapQuoteData { sell_token_value: BigUint::from(20000u32), ..swap_quote() };
        let recipe = recipe(provider(quote, 20000), None).with_sell_amount(BigUint::from(20000u32));

        let err = recipe
            .get_recipe_output(input())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RecipeError::Step(StepError::Invalid { ref step, .. })
                if step == "Approve ERC20 Spender"
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_quote_exceeding_slippage() {
        let quote = SwapQuoteData { minimum_buy_amount: BigUint::from(480u32), ..swap_quote() };
        let recipe = recipe(provider(quote, 11970), None);

        let err = recipe
            .get_recipe_output(input())
            .await
            .unwrap_err();

        assert!(matches!(err, RecipeError::Step(StepError::Invalid { .. })));
        assert_eq!(recipe.last_quote().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_unsupported_network() {
        let mut provider = MockSwapQuoteProvider::new();
        provider
            .expect_exchange_name()
            .return_const("0x Exchange".to_string());
        provider
            .expect_supports_network()
            .with(eq(NetworkName::Hardhat))
            .return_const(false);
        provider
            .expect_get_swap_quote()
            .never();
        let recipe = recipe(provider, None);

        let err = recipe
            .get_recipe_output(RecipeInput { network: NetworkName::Hardhat, ..input() })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RecipeError::UnsupportedNetwork { network: NetworkName::Hardhat, .. }
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_quote_failure() {
        let mut provider = MockSwapQuoteProvider::new();
        provider
            .expect_exchange_name()
            .return_const("0x Exchange".to_string());
        provider
            .expect_supports_network()
            .return_const(true);
        provider
            .expect_get_swap_quote()
            .return_once(|_| Err(QuoteError::NoRoute("no liquidity".to_string())));
        let recipe = recipe(provider, None);

        let err = recipe
            .get_recipe_output(input())
            .await
            .unwrap_err();

        assert!(matches!(err, RecipeError::Quote(QuoteError::NoRoute(_))));
        assert_eq!(recipe.last_quote().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_without_sell_balance() {
        let mut provider = MockSwapQuoteProvider::new();
        provider
            .expect_exchange_name()
            .return_const("0x Exchange".to_string());
        provider
            .expect_supports_network()
            .return_const(true);
        provider
            .expect_get_swap_quote()
            .never();
        let recipe = recipe(provider, None);
        let only_buy_token = RecipeInput::new(
            NetworkName::Ethereum,
            vec![ERC20Amount::new(buy(), BigUint::from(100u32))],
            vec![],
        );

        let res = recipe
            .get_recipe_output(only_buy_token)
            .await;

        assert!(matches!(res, Err(RecipeError::Step(StepError::Invalid { .. }))));
    }

    #[test_log::test(tokio::test)]
    async fn test_extraction_from_unrelated_output() {
        let recipe = recipe(provider(swap_quote(), 11970), None);
        let output = recipe
            .get_recipe_output(input())
            .await
            .unwrap();
        let without_swap = RecipeOutput {
            step_outputs: output
                .step_outputs
                .into_iter()
                .filter(|step| step.role != StepRole::Swap)
                .collect(),
            ..output
        };

        assert_eq!(recipe.get_buy_sell_amounts_from_recipe_output(&without_swap), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_swap_approves_quote_spender() {
        let recipe = recipe(provider(swap_quote(), 10000), None)
            .with_sell_amount(BigUint::from(10000u32));

        let output = recipe
            .get_recipe_output(input())
            .await
            .unwrap();

        let approve = &output.step_outputs[1];
        assert_eq!(approve.role, StepRole::Approve);
        assert_eq!(approve.output_erc20_amounts[0].approved_spender, Some(spender()));
        assert_eq!(approve.output_erc20_amounts[1].approved_spender, None);
    }
}
