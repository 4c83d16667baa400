use alloy_primitives::{Address, Bytes};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallDescriptorError {
    #[error("Call is missing `{0}`")]
    MissingField(&'static str),
}

/// A fully populated contract call, ready to be bundled into the recipe transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    pub value: BigUint,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>, value: BigUint) -> Self {
        Self { to, data: data.into(), value }
    }
}

/// Call shape as returned by call builders and quote APIs, where any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedTransaction {
    pub to: Option<Address>,
    pub data: Option<Bytes>,
    pub value: Option<BigUint>,
}

impl From<ContractCall> for PopulatedTransaction {
    fn from(value: ContractCall) -> Self {
        Self { to: Some(value.to), data: Some(value.data), value: Some(value.value) }
    }
}

impl TryFrom<PopulatedTransaction> for ContractCall {
    type Error = CallDescriptorError;

    fn try_from(value: PopulatedTransaction) -> Result<Self, Self::Error> {
        Ok(ContractCall {
            to: value
                .to
                .ok_or(CallDescriptorError::MissingField("to"))?,
            data: value
                .data
                .ok_or(CallDescriptorError::MissingField("data"))?,
            value: value
                .value
                .ok_or(CallDescriptorError::MissingField("value"))?,
        })
    }
}
