//! Placeholder pricing at a fixed exchange rate

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::math::calculate_fee;
use crate::shared::errors::SwapError;
use crate::shared::types::Token;
use super::{PricingProvider, SwapQuote};

/// Prices every pair at one configured rate with no price impact.
/// Stands in until the AMM view function is deployed.
#[derive(Debug, Clone)]
pub struct FixedRatePricing {
    rate: Decimal,
}

impl FixedRatePricing {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

#[async_trait]
impl PricingProvider for FixedRatePricing {
    async fn quote(&self, token_in: &Token, token_out: &Token, amount_in: Decimal) -> Result<SwapQuote, SwapError> {
        if token_in.symbol == token_out.symbol {
            return Err(SwapError::IdenticalTokens(token_in.symbol.clone()));
        }
        let amount_out = amount_in
            .checked_mul(self.rate)
            .ok_or_else(|| SwapError::InvalidAmount(amount_in.to_string()))?;
        Ok(SwapQuote {
            amount_in,
            amount_out: amount_out.normalize(),
            price_impact: Decimal::ZERO,
            fee: calculate_fee(amount_in),
            rate: self.rate,
            route: [token_in.symbol.clone(), token_out.symbol.clone()],
        })
    }
}
