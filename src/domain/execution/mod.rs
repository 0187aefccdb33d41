//! Execution domain - router entry-function payloads

mod transaction_builder;
mod transaction_validator;

pub use transaction_builder::TransactionBuilder;
pub use transaction_validator::TransactionValidator;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::types::Token;

/// Payload kind expected by the wallet for Move entry functions
pub const ENTRY_FUNCTION_PAYLOAD: &str = "entry_function_payload";

/// Router module hosting the AMM entry points
pub const ROUTER_MODULE: &str = "router";

/// Router entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterEntry {
    SwapExactTokensForTokens,
    AddLiquidity,
    RemoveLiquidity,
}

impl RouterEntry {
    pub fn name(&self) -> &'static str {
        match self {
            RouterEntry::SwapExactTokensForTokens => "swap_exact_tokens_for_tokens",
            RouterEntry::AddLiquidity => "add_liquidity",
            RouterEntry::RemoveLiquidity => "remove_liquidity",
        }
    }
}

/// Transaction payload handed to the wallet. Field names and order follow the
/// contract calling convention and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<String>,
}

/// Swap execution request
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: Decimal,
    pub min_amount_out: Decimal,
}

/// Add-liquidity request
#[derive(Debug, Clone)]
pub struct AddLiquidityRequest {
    pub token_a: Token,
    pub token_b: Token,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub min_amount_a: Decimal,
    pub min_amount_b: Decimal,
}

/// Remove-liquidity request; LP amount is already in base units
#[derive(Debug, Clone)]
pub struct RemoveLiquidityRequest {
    pub token_a: Token,
    pub token_b: Token,
    pub lp_amount: u64,
    pub min_amount_a: Decimal,
    pub min_amount_b: Decimal,
}
