//! Calldata encoders for the standard interfaces the bundled steps call.

pub mod erc20;
pub mod erc721;
pub mod weth;

use alloy_primitives::U256;
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Amount {0} does not fit in uint256")]
    Overflow(BigUint),
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),
}

/// Converts an arbitrary precision amount into a `uint256`.
pub fn to_u256(amount: &BigUint) -> Result<U256, EncodeError> {
    U256::try_from_be_slice(&amount.to_bytes_be())
        .ok_or_else(|| EncodeError::Overflow(amount.clone()))
}
