//! Pricing domain - swap quotes

mod fixed_rate;

pub use fixed_rate::FixedRatePricing;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::parse_amount;
use crate::shared::errors::SwapError;
use crate::shared::types::Token;

/// Ephemeral, non-binding swap estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    /// Percent
    pub price_impact: Decimal,
    pub fee: Decimal,
    /// Output units per input unit
    pub rate: Decimal,
    /// Token symbols, input first
    pub route: [String; 2],
}

/// Source of swap prices. The flow only depends on this trait, so the
/// placeholder rate can be replaced by an on-chain pool read.
#[async_trait]
pub trait PricingProvider: Send + Sync {
    async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: Decimal) -> Result<SwapQuote, SwapError>;
}

/// Quote the raw form input. `Ok(None)` when there is nothing to quote:
/// empty or zero amount, or no output token selected.
pub async fn quote_input(
    pricing: &dyn PricingProvider,
    token_in: &Token,
    token_out: Option<&Token>,
    amount_in: &str,
) -> Result<Option<SwapQuote>, SwapError> {
    let Some(token_out) = token_out else {
        return Ok(None);
    };
    let amount = match parse_amount(amount_in)? {
        Some(amount) if amount > Decimal::ZERO => amount,
        _ => return Ok(None),
    };
    pricing.quote(token_in, token_out, amount).await.map(Some)
}
