//! Selection of the resource records a step is entitled to consume.
//!
//! Every step goes through these helpers instead of indexing its input directly. They split
//! the incoming records into the ones handed to the step and the ones the step must forward
//! untouched, and they reject inputs that can't cover what the step needs.

use alloy_primitives::Address;
use cookbook_common::models::{
    compare_nft, NFTAmount, NFTTokenType, StepOutputERC20Amount, StepOutputNFT, TokenKind,
};
use num_bigint::BigUint;
use num_traits::Zero;

use super::StepConfig;
use crate::errors::StepError;

/// Approval a record must carry to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpenderRequirement {
    Any,
    /// The record must be approved for exactly this spender.
    Approved(Address),
}

/// Predicate over ERC20 records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ERC20Filter {
    pub token: TokenKind,
    pub spender: SpenderRequirement,
}

impl ERC20Filter {
    pub fn token(token: TokenKind) -> Self {
        Self { token, spender: SpenderRequirement::Any }
    }

    pub fn approved(token: TokenKind, spender: Address) -> Self {
        Self { token, spender: SpenderRequirement::Approved(spender) }
    }

    pub fn matches(&self, record: &StepOutputERC20Amount) -> bool {
        if record.token != self.token {
            return false;
        }
        match self.spender {
            SpenderRequirement::Any => true,
            SpenderRequirement::Approved(spender) => record.approved_spender == Some(spender),
        }
    }

    fn describe(&self) -> String {
        match self.spender {
            SpenderRequirement::Any => format!("{}", self.token),
            SpenderRequirement::Approved(spender) => format!(
                "{} approved for spender {}",
                self.token,
                spender.to_string().to_lowercase()
            ),
        }
    }
}

/// Result of an ERC20 selection. Both lists are freshly built records; the input records are
/// consumed by the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ERC20Selection {
    pub erc20_amounts_for_step: Vec<StepOutputERC20Amount>,
    pub unused_erc20_amounts: Vec<StepOutputERC20Amount>,
}

/// Selects the records matching `filter`.
///
/// Without `amount` every matching record is selected whole. With `amount`, matching
/// records are consumed in input order until `amount` (measured in `min_balance`) is
/// covered; the record that crosses the boundary is split into a consumed part and a
/// remainder which keeps the record's spender and recipient and is forwarded with the
/// unused records.
///
/// Fails when nothing matches, when a matching record's `min_balance` exceeds its
/// `expected_balance`, when the matching records' total `min_balance` is below `amount`, or
/// when nothing ends up selected.
pub fn select_erc20_amounts(
    config: &StepConfig,
    inputs: Vec<StepOutputERC20Amount>,
    filter: &ERC20Filter,
    amount: Option<&BigUint>,
) -> Result<ERC20Selection, StepError> {
    let mut matched = false;
    let mut available = BigUint::zero();
    for record in inputs
        .iter()
        .filter(|record| filter.matches(record))
    {
        if record.min_balance > record.expected_balance {
            return Err(config.invalid(format!(
                "Minimum balance {} exceeds expected balance {} for {}.",
                record.min_balance,
                record.expected_balance,
                filter.describe()
            )));
        }
        matched = true;
        available += &record.min_balance;
    }

    if !matched {
        return Err(config.invalid(format!("No input balance for {}.", filter.describe())));
    }

    if let Some(amount) = amount {
        if &available < amount {
            return Err(config.invalid(format!(
                "Specified amount {amount} exceeds balance {available} for {}.",
                filter.describe()
            )));
        }
    }

    let mut remaining = amount.cloned();
    let mut erc20_amounts_for_step = Vec::new();
    let mut unused_erc20_amounts = Vec::new();

    for record in inputs {
        if !filter.matches(&record) {
            unused_erc20_amounts.push(record);
            continue;
        }
        match remaining.as_mut() {
            None => erc20_amounts_for_step.push(record),
            Some(left) if left.is_zero() => unused_erc20_amounts.push(record),
            Some(left) if record.min_balance <= *left => {
                *left -= &record.min_balance;
                erc20_amounts_for_step.push(record);
            }
            Some(left) => {
                let consumed = left.clone();
                let remainder = record.with_balances(
                    &record.expected_balance - &consumed,
                    &record.min_balance - &consumed,
                );
                erc20_amounts_for_step.push(record.with_balances(consumed.clone(), consumed));
                unused_erc20_amounts.push(remainder);
                left.set_zero();
            }
        }
    }

    if erc20_amounts_for_step.is_empty() {
        return Err(config.invalid(format!("No amount selected for {}.", filter.describe())));
    }

    Ok(ERC20Selection { erc20_amounts_for_step, unused_erc20_amounts })
}

/// Selected records cut down to what is guaranteed on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuaranteedAmounts {
    /// Sum of the records' `min_balance`.
    pub total: BigUint,
    /// The records with `expected_balance` lowered to `min_balance`.
    pub guaranteed: Vec<StepOutputERC20Amount>,
    /// What may or may not arrive on top, as records with a zero `min_balance`.
    pub surplus: Vec<StepOutputERC20Amount>,
}

/// Steps that act on a fixed amount on-chain only act on `min_balance`; the rest of an
/// expected balance is forwarded as surplus.
pub fn split_guaranteed(records: Vec<StepOutputERC20Amount>) -> GuaranteedAmounts {
    let mut total = BigUint::zero();
    let mut guaranteed = Vec::with_capacity(records.len());
    let mut surplus = Vec::new();

    for record in records {
        let min_balance = record.min_balance.clone();
        total += &min_balance;
        if record.expected_balance > min_balance {
            let unguaranteed = &record.expected_balance - &min_balance;
            surplus.push(record.with_balances(unguaranteed, BigUint::zero()));
        }
        guaranteed.push(record.with_balances(min_balance.clone(), min_balance));
    }

    GuaranteedAmounts { total, guaranteed, surplus }
}

/// Predicate over NFT records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFTFilter {
    pub nft_address: Address,
    pub nft_token_type: NFTTokenType,
    pub token_sub_id: String,
    /// Required ownership state: `None` only matches NFTs that don't own an account.
    pub owns: Option<Address>,
}

impl NFTFilter {
    pub fn matches(&self, record: &StepOutputNFT) -> bool {
        let wanted = NFTAmount::new(
            self.nft_address,
            self.nft_token_type,
            self.token_sub_id.clone(),
            record.nft.amount.clone(),
        );
        compare_nft(&record.nft, &wanted) && record.owns == self.owns
    }
}

/// Selects the first NFT matching `filter`; every other NFT is returned as unused.
pub fn select_nft(
    config: &StepConfig,
    inputs: Vec<StepOutputNFT>,
    filter: &NFTFilter,
) -> Result<(StepOutputNFT, Vec<StepOutputNFT>), StepError> {
    let mut nft_for_step = None;
    let mut unused_nfts = Vec::with_capacity(inputs.len());

    for record in inputs {
        if nft_for_step.is_none() && filter.matches(&record) {
            nft_for_step = Some(record);
        } else {
            unused_nfts.push(record);
        }
    }

    let nft_for_step = nft_for_step.ok_or_else(|| {
        config.invalid(format!(
            "No input NFT {} #{} ({}).",
            filter.nft_address.to_string().to_lowercase(),
            filter.token_sub_id,
            filter.nft_token_type
        ))
    })?;
    Ok((nft_for_step, unused_nfts))
}
