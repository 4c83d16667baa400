pub mod call;
pub mod erc20;
pub mod nft;
pub mod quote;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub use self::{
    call::{CallDescriptorError, ContractCall, PopulatedTransaction},
    erc20::{
        compare_erc20_info, ERC20Amount, ERC20AmountRecipient, ERC20Info, StepOutputERC20Amount,
        TokenKind,
    },
    nft::{compare_nft, NFTAmount, NFTAmountRecipient, NFTTokenType, StepOutputNFT},
    quote::{SwapQuoteData, SwapQuoteParams},
};

/// Networks a recipe can be built for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkName {
    #[default]
    Ethereum,
    Polygon,
    Bsc,
    Arbitrum,
    Hardhat,
}

/// Lower-cases a recipient if it is a hex address; labels like `"RAILGUN Shield Fee"` are
/// kept verbatim.
pub fn normalize_recipient(recipient: &str) -> String {
    if recipient.starts_with("0x") &&
        recipient
            .parse::<alloy_primitives::Address>()
            .is_ok()
    {
        recipient.to_lowercase()
    } else {
        recipient.to_string()
    }
}
