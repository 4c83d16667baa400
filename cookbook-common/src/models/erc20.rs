//! ERC20 resource records.
//!
//! Records are value objects: steps never mutate the records they receive, they build new
//! ones from them. Two token identities are considered equal when their [`TokenKind`]s
//! are equal, regardless of decimals.

use std::fmt;

use alloy_primitives::Address;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Identity of a fungible token within a network.
///
/// The network base token (ETH, MATIC, BNB, ...) has no contract of its own, every other
/// token is identified by its contract address. Addresses are compared as bytes, so the
/// textual case (checksummed or not) never matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Native,
    Contract(Address),
}

impl TokenKind {
    pub fn contract_address(&self) -> Option<Address> {
        match self {
            TokenKind::Native => None,
            TokenKind::Contract(address) => Some(*address),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Native => write!(f, "base token"),
            TokenKind::Contract(address) => write!(f, "{}", address.to_string().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ERC20Info {
    pub token: TokenKind,
    pub decimals: u8,
}

impl ERC20Info {
    pub fn new(token: TokenKind, decimals: u8) -> Self {
        Self { token, decimals }
    }

    pub fn contract(address: Address, decimals: u8) -> Self {
        Self { token: TokenKind::Contract(address), decimals }
    }

    pub fn native(decimals: u8) -> Self {
        Self { token: TokenKind::Native, decimals }
    }
}

/// Returns whether two token infos refer to the same token. Symmetric; decimals are ignored.
pub fn compare_erc20_info(a: &ERC20Info, b: &ERC20Info) -> bool {
    a.token == b.token
}

/// A plain token amount, as handed to a recipe or returned by a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ERC20Amount {
    #[serde(flatten)]
    pub info: ERC20Info,
    pub amount: BigUint,
}

impl ERC20Amount {
    pub fn new(info: ERC20Info, amount: BigUint) -> Self {
        Self { info, amount }
    }
}

/// An ERC20 balance in flight between two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutputERC20Amount {
    pub token: TokenKind,
    pub decimals: u8,
    /// Best-case balance available after the producing step.
    pub expected_balance: BigUint,
    /// Balance guaranteed after slippage. Never above `expected_balance`.
    pub min_balance: BigUint,
    /// Address currently allowed to move this balance on-chain.
    pub approved_spender: Option<Address>,
    /// Final recipient designated for this balance, if any.
    pub recipient: Option<String>,
}

impl StepOutputERC20Amount {
    /// Creates a record with identical expected and minimum balances and no spender.
    pub fn new(info: ERC20Info, amount: BigUint) -> Self {
        Self {
            token: info.token,
            decimals: info.decimals,
            expected_balance: amount.clone(),
            min_balance: amount,
            approved_spender: None,
            recipient: None,
        }
    }

    pub fn info(&self) -> ERC20Info {
        ERC20Info { token: self.token, decimals: self.decimals }
    }

    /// Copy of this record carrying other balances; spender and recipient are kept.
    pub fn with_balances(&self, expected_balance: BigUint, min_balance: BigUint) -> Self {
        Self { expected_balance, min_balance, ..self.clone() }
    }

    pub fn with_approved_spender(self, approved_spender: Option<Address>) -> Self {
        Self { approved_spender, ..self }
    }

    pub fn with_recipient(self, recipient: Option<String>) -> Self {
        Self { recipient, ..self }
    }
}

impl From<ERC20Amount> for StepOutputERC20Amount {
    fn from(value: ERC20Amount) -> Self {
        StepOutputERC20Amount::new(value.info, value.amount)
    }
}

/// An amount that leaves the pipeline towards `recipient` (a fee, a payment, a transfer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ERC20AmountRecipient {
    #[serde(flatten)]
    pub info: ERC20Info,
    pub amount: BigUint,
    pub recipient: String,
}

impl ERC20AmountRecipient {
    pub fn new(info: ERC20Info, amount: BigUint, recipient: impl Into<String>) -> Self {
        Self { info, amount, recipient: recipient.into() }
    }
}
