//! Request validation before any payload is built

use rust_decimal::Decimal;

use crate::shared::errors::SwapError;
use crate::shared::types::Token;
use super::{AddLiquidityRequest, RemoveLiquidityRequest, SwapRequest};

/// Validates execution requests
pub struct TransactionValidator;

impl TransactionValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_pool(&self, pool_address: &str) -> Result<(), SwapError> {
        if pool_address.trim().is_empty() {
            return Err(SwapError::ContractNotDeployed);
        }
        Ok(())
    }

    pub fn validate_swap(&self, request: &SwapRequest) -> Result<(), SwapError> {
        self.validate_pair(&request.token_in, &request.token_out)?;
        require_positive(request.amount_in)?;
        require_non_negative(request.min_amount_out)
    }

    pub fn validate_add_liquidity(&self, request: &AddLiquidityRequest) -> Result<(), SwapError> {
        self.validate_pair(&request.token_a, &request.token_b)?;
        require_positive(request.amount_a)?;
        require_positive(request.amount_b)?;
        require_non_negative(request.min_amount_a)?;
        require_non_negative(request.min_amount_b)
    }

    pub fn validate_remove_liquidity(&self, request: &RemoveLiquidityRequest) -> Result<(), SwapError> {
        self.validate_pair(&request.token_a, &request.token_b)?;
        if request.lp_amount == 0 {
            return Err(SwapError::InvalidAmount("0".to_string()));
        }
        require_non_negative(request.min_amount_a)?;
        require_non_negative(request.min_amount_b)
    }

    fn validate_pair(&self, a: &Token, b: &Token) -> Result<(), SwapError> {
        for token in [a, b] {
            if !token.is_tradable() {
                return Err(SwapError::TokenNotTradable(token.symbol.clone()));
            }
        }
        if a.address == b.address {
            return Err(SwapError::IdenticalTokens(a.symbol.clone()));
        }
        Ok(())
    }
}

impl Default for TransactionValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn require_positive(amount: Decimal) -> Result<(), SwapError> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}

fn require_non_negative(amount: Decimal) -> Result<(), SwapError> {
    if amount.is_sign_negative() {
        return Err(SwapError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}
