use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;

use super::{to_u256, EncodeError};
use crate::models::{ContractCall, NFTAmount};

sol! {
    function safeTransferFrom(address from, address to, uint256 tokenId) external;
}

/// Transfer of a single ERC721 token from `from` to `to`.
pub fn safe_transfer_from_call(
    nft: &NFTAmount,
    from: Address,
    to: Address,
) -> Result<ContractCall, EncodeError> {
    let token_id = nft
        .token_id()
        .ok_or_else(|| EncodeError::InvalidTokenId(nft.token_sub_id.clone()))?;
    let data = safeTransferFromCall { from, to, tokenId: to_u256(&token_id)? }.abi_encode();
    Ok(ContractCall::new(nft.nft_address, data, BigUint::default()))
}
