use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NetworkName, SwapQuoteData, SwapQuoteParams};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Quote provider does not support network {0}")]
    UnsupportedNetwork(NetworkName),
    #[error("No route found: {0}")]
    NoRoute(String),
    #[error("Quote request failed: {0}")]
    RequestFailed(String),
}

/// Source of swap quotes (0x, Uniswap, ...).
///
/// Implementations own their transport, retries and timeouts; recipes only see the
/// resulting [`SwapQuoteData`] or a [`QuoteError`].
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait SwapQuoteProvider: Send + Sync {
    /// Display name of the exchange, used as recipient of the sold amount.
    fn exchange_name(&self) -> String;

    fn supports_network(&self, network: NetworkName) -> bool;

    /// Prices selling `params.sell_amount` of `params.sell` for `params.buy`.
    async fn get_swap_quote(&self, params: SwapQuoteParams) -> Result<SwapQuoteData, QuoteError>;
}
