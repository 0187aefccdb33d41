//! Transaction building and construction

use crate::math::to_base_units;
use crate::shared::errors::SwapError;
use super::{
    AddLiquidityRequest, EntryFunctionPayload, RemoveLiquidityRequest, RouterEntry, SwapRequest,
    TransactionValidator, ENTRY_FUNCTION_PAYLOAD, ROUTER_MODULE,
};

/// Builds router entry-function payloads for one pool address
pub struct TransactionBuilder {
    pool_address: String,
    validator: TransactionValidator,
}

impl TransactionBuilder {
    pub fn new(pool_address: impl Into<String>) -> Self {
        Self {
            pool_address: pool_address.into(),
            validator: TransactionValidator::new(),
        }
    }

    pub fn pool_address(&self) -> &str {
        &self.pool_address
    }

    /// `<pool>::router::swap_exact_tokens_for_tokens<In, Out>(pool, amount_in, min_amount_out)`
    pub fn build_swap(&self, request: &SwapRequest) -> Result<EntryFunctionPayload, SwapError> {
        self.validator.validate_pool(&self.pool_address)?;
        self.validator.validate_swap(request)?;

        let amount_in = to_base_units(request.amount_in, request.token_in.decimals)?;
        let min_amount_out = to_base_units(request.min_amount_out, request.token_out.decimals)?;

        Ok(self.payload(
            RouterEntry::SwapExactTokensForTokens,
            [&request.token_in.address, &request.token_out.address],
            vec![amount_in.to_string(), min_amount_out.to_string()],
        ))
    }

    /// `<pool>::router::add_liquidity<A, B>(pool, amount_a, amount_b, min_a, min_b)`
    pub fn build_add_liquidity(&self, request: &AddLiquidityRequest) -> Result<EntryFunctionPayload, SwapError> {
        self.validator.validate_pool(&self.pool_address)?;
        self.validator.validate_add_liquidity(request)?;

        let decimals_a = request.token_a.decimals;
        let decimals_b = request.token_b.decimals;
        Ok(self.payload(
            RouterEntry::AddLiquidity,
            [&request.token_a.address, &request.token_b.address],
            vec![
                to_base_units(request.amount_a, decimals_a)?.to_string(),
                to_base_units(request.amount_b, decimals_b)?.to_string(),
                to_base_units(request.min_amount_a, decimals_a)?.to_string(),
                to_base_units(request.min_amount_b, decimals_b)?.to_string(),
            ],
        ))
    }

    /// `<pool>::router::remove_liquidity<A, B>(pool, lp_amount, min_a, min_b)`
    pub fn build_remove_liquidity(&self, request: &RemoveLiquidityRequest) -> Result<EntryFunctionPayload, SwapError> {
        self.validator.validate_pool(&self.pool_address)?;
        self.validator.validate_remove_liquidity(request)?;

        Ok(self.payload(
            RouterEntry::RemoveLiquidity,
            [&request.token_a.address, &request.token_b.address],
            vec![
                request.lp_amount.to_string(),
                to_base_units(request.min_amount_a, request.token_a.decimals)?.to_string(),
                to_base_units(request.min_amount_b, request.token_b.decimals)?.to_string(),
            ],
        ))
    }

    fn payload(&self, entry: RouterEntry, type_arguments: [&String; 2], amounts: Vec<String>) -> EntryFunctionPayload {
        let mut arguments = Vec::with_capacity(amounts.len() + 1);
        arguments.push(self.pool_address.clone());
        arguments.extend(amounts);

        EntryFunctionPayload {
            payload_type: ENTRY_FUNCTION_PAYLOAD.to_string(),
            function: format!("{}::{}::{}", self.pool_address, ROUTER_MODULE, entry.name()),
            type_arguments: type_arguments.iter().map(|t| t.to_string()).collect(),
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::Token;
    use rust_decimal_macros::dec;

    fn token(symbol: &str, address: &str, decimals: u8) -> Token {
        Token {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
            address: address.to_string(),
            icon: symbol[..1].to_string(),
            is_native: false,
        }
    }

    fn supra() -> Token {
        token("SUPRA", "0x1::supra_coin::SupraCoin", 8)
    }

    fn usdc() -> Token {
        token("USDC", "0xcafe::usdc::USDC", 6)
    }

    #[test]
    fn test_swap_payload_shape() {
        let builder = TransactionBuilder::new("0xpool");
        let payload = builder
            .build_swap(&SwapRequest {
                token_in: supra(),
                token_out: usdc(),
                amount_in: dec!(10),
                min_amount_out: dec!(14.925),
            })
            .unwrap();

        assert_eq!(payload.payload_type, "entry_function_payload");
        assert_eq!(payload.function, "0xpool::router::swap_exact_tokens_for_tokens");
        assert_eq!(payload.type_arguments, vec!["0x1::supra_coin::SupraCoin", "0xcafe::usdc::USDC"]);
        assert_eq!(payload.arguments, vec!["0xpool", "1000000000", "14925000"]);
    }

    #[test]
    fn test_payload_json_field_order() {
        let builder = TransactionBuilder::new("0xpool");
        let payload = builder
            .build_remove_liquidity(&RemoveLiquidityRequest {
                token_a: supra(),
                token_b: usdc(),
                lp_amount: 500,
                min_amount_a: dec!(1),
                min_amount_b: dec!(2),
            })
            .unwrap();

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"type":"entry_function_payload","function":"0xpool::router::remove_liquidity","type_arguments":["0x1::supra_coin::SupraCoin","0xcafe::usdc::USDC"],"arguments":["0xpool","500","100000000","2000000"]}"#
        );
    }

    #[test]
    fn test_add_liquidity_arguments() {
        let builder = TransactionBuilder::new("0xpool");
        let payload = builder
            .build_add_liquidity(&AddLiquidityRequest {
                token_a: supra(),
                token_b: usdc(),
                amount_a: dec!(1),
                amount_b: dec!(1.5),
                min_amount_a: dec!(0.995),
                min_amount_b: dec!(1.4925),
            })
            .unwrap();

        assert_eq!(payload.function, "0xpool::router::add_liquidity");
        assert_eq!(payload.arguments, vec!["0xpool", "100000000", "1500000", "99500000", "1492500"]);
    }

    #[test]
    fn test_rejects_placeholder_tokens_and_missing_pool() {
        let request = SwapRequest {
            token_in: supra(),
            token_out: token("USDT", "", 6),
            amount_in: dec!(1),
            min_amount_out: dec!(1),
        };
        let builder = TransactionBuilder::new("0xpool");
        assert_eq!(builder.build_swap(&request), Err(SwapError::TokenNotTradable("USDT".to_string())));

        let builder = TransactionBuilder::new("");
        assert_eq!(builder.build_swap(&request), Err(SwapError::ContractNotDeployed));
    }

    #[test]
    fn test_rejects_zero_amount() {
        let builder = TransactionBuilder::new("0xpool");
        let request = SwapRequest {
            token_in: supra(),
            token_out: usdc(),
            amount_in: dec!(0),
            min_amount_out: dec!(0),
        };
        assert!(matches!(builder.build_swap(&request), Err(SwapError::InvalidAmount(_))));
    }
}
