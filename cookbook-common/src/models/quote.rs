//! Quote records exchanged with swap quote collaborators.

use alloy_primitives::Address;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::models::{ERC20Amount, ERC20Info, NetworkName, PopulatedTransaction};

/// Everything a quote provider needs to price a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuoteParams {
    pub network: NetworkName,
    pub sell: ERC20Info,
    pub buy: ERC20Info,
    pub sell_amount: BigUint,
    /// Accepted slippage in basis points (1/100th of a percent).
    pub slippage_bps: u32,
    /// Address the swap is executed from, usually the network's relay adapt contract.
    pub taker: Address,
}

/// A priced swap as returned by a quote provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuoteData {
    pub sell: ERC20Info,
    pub sell_token_value: BigUint,
    pub buy_erc20_amount: ERC20Amount,
    /// Buy amount guaranteed after slippage.
    pub minimum_buy_amount: BigUint,
    /// Contract that must be approved to pull the sell token. `None` for base token sells.
    pub spender: Option<Address>,
    pub cross_contract_call: PopulatedTransaction,
    /// Informational only.
    pub price: String,
    /// Informational only.
    pub guaranteed_price: String,
    pub slippage_bps: u32,
}
