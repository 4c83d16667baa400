use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;

use super::{to_u256, EncodeError};
use crate::models::ContractCall;

// ERC20 interface definition
// Copied from EIP-20: https://eips.ethereum.org/EIPS/eip-20
sol! {
    function transfer(address _to, uint256 _value) public returns (bool success);
    function approve(address _spender, uint256 _value) public returns (bool success);
}

/// Encode approve(address,uint256) call
pub fn encode_approve(spender: Address, value: &BigUint) -> Result<Bytes, EncodeError> {
    Ok(approveCall { _spender: spender, _value: to_u256(value)? }
        .abi_encode()
        .into())
}

/// Encode transfer(address,uint256) call
pub fn encode_transfer(to: Address, value: &BigUint) -> Result<Bytes, EncodeError> {
    Ok(transferCall { _to: to, _value: to_u256(value)? }
        .abi_encode()
        .into())
}

/// Approval of `spender` on `token` for `value`.
pub fn approve_call(
    token: Address,
    spender: Address,
    value: &BigUint,
) -> Result<ContractCall, EncodeError> {
    Ok(ContractCall::new(token, encode_approve(spender, value)?, BigUint::default()))
}

/// Transfer of `value` units of `token` to `to`.
pub fn transfer_call(
    token: Address,
    to: Address,
    value: &BigUint,
) -> Result<ContractCall, EncodeError> {
    Ok(ContractCall::new(token, encode_transfer(to, value)?, BigUint::default()))
}
