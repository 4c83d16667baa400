//! Error types for steps and recipes.

use cookbook_common::{
    config::ConfigError,
    contract::EncodeError,
    models::{CallDescriptorError, NetworkName},
    traits::QuoteError,
};
use thiserror::Error;

/// Errors that make a step's output invalid. Always fatal for the recipe being built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No input satisfies the step's requirements, or the output breaks an invariant.
    #[error("{step} step is invalid. {reason}")]
    Invalid { step: String, reason: String },

    /// A collaborator handed over a call that can't be forwarded.
    #[error("{step} step is invalid. Malformed call: {source}")]
    MalformedCall {
        step: String,
        #[source]
        source: CallDescriptorError,
    },

    /// Calldata for the step could not be encoded.
    #[error("{step} step is invalid. Encoding failed: {source}")]
    Encoding {
        step: String,
        #[source]
        source: EncodeError,
    },
}

impl StepError {
    pub fn invalid(step: &str, reason: impl Into<String>) -> Self {
        StepError::Invalid { step: step.to_string(), reason: reason.into() }
    }

    pub fn malformed_call(step: &str, source: CallDescriptorError) -> Self {
        StepError::MalformedCall { step: step.to_string(), source }
    }

    pub fn encoding(step: &str, source: EncodeError) -> Self {
        StepError::Encoding { step: step.to_string(), source }
    }
}

/// Errors that abort building a recipe. No partial output is produced.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe {recipe} is not supported on network {network}.")]
    UnsupportedNetwork { recipe: String, network: NetworkName },

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("Quote failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("Network config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_display() {
        let err = StepError::invalid("Swap", "No input matches sell token.");

        assert_eq!(err.to_string(), "Swap step is invalid. No input matches sell token.");
    }

    #[test]
    fn test_malformed_call_display() {
        let err = StepError::malformed_call("Swap", CallDescriptorError::MissingField("data"));

        assert_eq!(err.to_string(), "Swap step is invalid. Malformed call: Call is missing `data`");
    }

    #[test]
    fn test_unsupported_network_display() {
        let err = RecipeError::UnsupportedNetwork {
            recipe: "Swap".to_string(),
            network: NetworkName::Bsc,
        };

        assert_eq!(err.to_string(), "Recipe Swap is not supported on network bsc.");
    }
}
