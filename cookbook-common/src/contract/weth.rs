//! Wrapped base token (WETH9 style) calls.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;

use super::{to_u256, EncodeError};
use crate::models::ContractCall;

sol! {
    function deposit() public payable;
    function withdraw(uint256 wad) public;
}

/// Wraps `amount` of base token; the amount travels as call value.
pub fn deposit_call(wrapped_token: Address, amount: &BigUint) -> ContractCall {
    ContractCall::new(wrapped_token, depositCall {}.abi_encode(), amount.clone())
}

/// Unwraps `amount` of the wrapped token back into base token.
pub fn withdraw_call(
    wrapped_token: Address,
    amount: &BigUint,
) -> Result<ContractCall, EncodeError> {
    let data = withdrawCall { wad: to_u256(amount)? }.abi_encode();
    Ok(ContractCall::new(wrapped_token, data, BigUint::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_call() {
        let call = deposit_call(Address::repeat_byte(0x01), &BigUint::from(10u8));

        // deposit()
        assert_eq!(call.data.as_ref(), &[0xd0, 0xe3, 0x0d, 0xb0]);
        assert_eq!(call.value, BigUint::from(10u8));
    }

    #[test]
    fn test_withdraw_call() {
        let call = withdraw_call(Address::repeat_byte(0x01), &BigUint::from(10u8)).unwrap();

        // withdraw(uint256)
        assert_eq!(&call.data[..4], &[0x2e, 0x1a, 0x7d, 0x4d]);
        assert_eq!(call.data[35], 10);
        assert_eq!(call.value, BigUint::default());
    }
}
