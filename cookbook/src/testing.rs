//! Shared fixtures for unit tests.

use alloy_primitives::{Address, Bytes};
use cookbook_common::models::{
    ERC20Amount, ERC20Info, NFTAmount, NFTTokenType, PopulatedTransaction, StepOutputERC20Amount,
    StepOutputNFT, SwapQuoteData, TokenKind,
};
use num_bigint::BigUint;

pub fn token_a_address() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn token_a() -> TokenKind {
    TokenKind::Contract(token_a_address())
}

pub fn token_b() -> TokenKind {
    TokenKind::Contract(Address::repeat_byte(0xb2))
}

pub fn spender() -> Address {
    Address::repeat_byte(0x22)
}

pub fn destination() -> Address {
    Address::repeat_byte(0xde)
}

pub fn exchange() -> Address {
    Address::repeat_byte(0xef)
}

pub fn nft_address() -> Address {
    Address::repeat_byte(0xbc)
}

/// 18 decimals record with no spender nor recipient.
pub fn erc20_record(token: TokenKind, expected: u64, min: u64) -> StepOutputERC20Amount {
    StepOutputERC20Amount::new(ERC20Info::new(token, 18), BigUint::from(expected))
        .with_balances(BigUint::from(expected), BigUint::from(min))
}

pub fn test_nft(sub_id: &str) -> StepOutputNFT {
    StepOutputNFT::new(NFTAmount::new(
        nft_address(),
        NFTTokenType::ERC721,
        sub_id,
        BigUint::from(1u8),
    ))
}

/// Sells 10000 of token A for 500 of token B, at least 495 after 1% slippage.
pub fn swap_quote() -> SwapQuoteData {
    SwapQuoteData {
        sell: ERC20Info::new(token_a(), 18),
        sell_token_value: BigUint::from(10000u32),
        buy_erc20_amount: ERC20Amount::new(ERC20Info::new(token_b(), 18), BigUint::from(500u32)),
        minimum_buy_amount: BigUint::from(495u32),
        spender: Some(spender()),
        cross_contract_call: PopulatedTransaction {
            to: Some(exchange()),
            data: Some(Bytes::from_static(&[0xd9, 0x62, 0x7a, 0xa4])),
            value: Some(BigUint::default()),
        },
        price: "0.05".to_string(),
        guaranteed_price: "0.0495".to_string(),
        slippage_bps: 100,
    }
}
