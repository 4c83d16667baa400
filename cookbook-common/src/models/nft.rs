use alloy_primitives::Address;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
pub enum NFTTokenType {
    ERC721,
    ERC1155,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NFTAmount {
    pub nft_address: Address,
    pub nft_token_type: NFTTokenType,
    /// Token id, as a decimal or 0x-prefixed hex string.
    pub token_sub_id: String,
    pub amount: BigUint,
}

impl NFTAmount {
    pub fn new(
        nft_address: Address,
        nft_token_type: NFTTokenType,
        token_sub_id: impl Into<String>,
        amount: BigUint,
    ) -> Self {
        Self { nft_address, nft_token_type, token_sub_id: token_sub_id.into(), amount }
    }

    /// Parses the sub id into its numeric value.
    pub fn token_id(&self) -> Option<BigUint> {
        parse_token_sub_id(&self.token_sub_id)
    }
}

/// Parses a decimal or 0x-prefixed hex token id.
pub fn parse_token_sub_id(sub_id: &str) -> Option<BigUint> {
    match sub_id.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(sub_id.as_bytes(), 10),
    }
}

/// An NFT in flight between two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutputNFT {
    #[serde(flatten)]
    pub nft: NFTAmount,
    /// Set when this NFT is the owner-of-record of an account created during the recipe.
    pub owns: Option<Address>,
    pub recipient: Option<String>,
}

impl StepOutputNFT {
    pub fn new(nft: NFTAmount) -> Self {
        Self { nft, owns: None, recipient: None }
    }

    pub fn with_owns(self, owns: Option<Address>) -> Self {
        Self { owns, ..self }
    }
}

impl From<NFTAmount> for StepOutputNFT {
    fn from(value: NFTAmount) -> Self {
        StepOutputNFT::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NFTAmountRecipient {
    #[serde(flatten)]
    pub nft: NFTAmount,
    pub recipient: String,
}

/// Returns whether two NFTs are the same token: address, type and numeric sub id.
pub fn compare_nft(a: &NFTAmount, b: &NFTAmount) -> bool {
    let same_id = match (a.token_id(), b.token_id()) {
        (Some(a_id), Some(b_id)) => a_id == b_id,
        _ => a.token_sub_id == b.token_sub_id,
    };
    a.nft_address == b.nft_address && a.nft_token_type == b.nft_token_type && same_id
}
