// src/math.rs
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::shared::errors::SwapError;

/// Pool fee charged on the input amount (0.3%)
pub const FEE_RATE: Decimal = dec!(0.003);

/// Fractional digits shown for the output amount
pub const OUTPUT_DISPLAY_DP: u32 = 6;

/// Parse a user-entered, non-negative decimal amount.
/// Empty input is `None` (nothing to quote yet).
pub fn parse_amount(input: &str) -> Result<Option<Decimal>, SwapError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let amount = Decimal::from_str(trimmed)
        .map_err(|_| SwapError::InvalidAmount(trimmed.to_string()))?;
    if amount.is_sign_negative() {
        return Err(SwapError::InvalidAmount(trimmed.to_string()));
    }
    Ok(Some(amount))
}

/// Fixed fee on the input amount, independent of the rate
pub fn calculate_fee(amount_in: Decimal) -> Decimal {
    (amount_in * FEE_RATE).normalize()
}

/// Calculate minimum output amount with slippage protection
pub fn calculate_min_out(amount_out: Decimal, slippage_pct: Decimal) -> Decimal {
    let slippage_multiplier = Decimal::ONE - slippage_pct / dec!(100);
    (amount_out * slippage_multiplier).max(Decimal::ZERO)
}

/// Convert a UI amount to integer base units, truncating extra precision
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, SwapError> {
    let invalid = || SwapError::InvalidAmount(amount.to_string());
    let scale = 10u64.checked_pow(decimals as u32).ok_or_else(invalid)?;
    amount
        .checked_mul(Decimal::from(scale))
        .ok_or_else(invalid)?
        .trunc()
        .to_u64()
        .ok_or_else(invalid)
}

/// Render an amount with a fixed number of fractional digits
pub fn format_fixed(amount: Decimal, dp: u32) -> String {
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}
