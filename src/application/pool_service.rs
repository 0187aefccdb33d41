//! Liquidity provision through the router

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::execution::{AddLiquidityRequest, RemoveLiquidityRequest, TransactionBuilder};
use crate::domain::session::SessionStore;
use crate::infrastructure::provider::ProviderBridge;
use crate::math::{calculate_min_out, parse_amount, FEE_RATE};
use crate::shared::errors::{SwapError, WalletError};
use crate::shared::types::{Pool, Token, TransactionResult};
use super::SubmissionGuard;

pub struct PoolService {
    store: Arc<SessionStore>,
    bridge: Arc<ProviderBridge>,
    builder: TransactionBuilder,
    slippage_pct: Decimal,
    submitting: AtomicBool,
}

impl PoolService {
    pub fn new(
        store: Arc<SessionStore>,
        bridge: Arc<ProviderBridge>,
        builder: TransactionBuilder,
        slippage_pct: Decimal,
    ) -> Self {
        Self {
            store,
            bridge,
            builder,
            slippage_pct,
            submitting: AtomicBool::new(false),
        }
    }

    /// Pairs of the native coin with every other listed token. Reserves are
    /// unknown until the pool contract exposes a view.
    pub fn available_pools(&self, tokens: &[Token]) -> Vec<Pool> {
        let Some(native) = tokens.iter().find(|t| t.is_native) else {
            return Vec::new();
        };
        let fee_pct = (FEE_RATE * Decimal::ONE_HUNDRED).to_f64().unwrap_or_default();
        tokens
            .iter()
            .filter(|t| !t.is_native)
            .map(|other| Pool {
                coin_a: native.clone(),
                coin_b: other.clone(),
                reserve_a: "0".to_string(),
                reserve_b: "0".to_string(),
                lp_supply: "0".to_string(),
                fee: fee_pct,
                apr: 0.0,
            })
            .collect()
    }

    fn require_connected(&self) -> Result<(), SwapError> {
        if !self.store.snapshot().is_connected() {
            return Err(WalletError::WalletNotConnected.into());
        }
        Ok(())
    }

    /// Deposit both sides; minimums are the deposits less slippage
    pub async fn add_liquidity(
        &self,
        token_a: &Token,
        token_b: &Token,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<TransactionResult, SwapError> {
        self.require_connected()?;
        let amount_a = positive_amount(amount_a)?;
        let amount_b = positive_amount(amount_b)?;

        let payload = self.builder.build_add_liquidity(&AddLiquidityRequest {
            token_a: token_a.clone(),
            token_b: token_b.clone(),
            amount_a,
            amount_b,
            min_amount_a: calculate_min_out(amount_a, self.slippage_pct),
            min_amount_b: calculate_min_out(amount_b, self.slippage_pct),
        })?;

        let _guard = SubmissionGuard::acquire(&self.submitting).ok_or(SwapError::SubmissionInFlight)?;
        info!("Adding liquidity {} {} + {} {}", amount_a, token_a.symbol, amount_b, token_b.symbol);
        Ok(self.submit(&payload).await)
    }

    /// Burn `lp_amount` LP tokens, accepting no less than the given minimums
    pub async fn remove_liquidity(
        &self,
        token_a: &Token,
        token_b: &Token,
        lp_amount: u64,
        min_amount_a: Decimal,
        min_amount_b: Decimal,
    ) -> Result<TransactionResult, SwapError> {
        self.require_connected()?;

        let payload = self.builder.build_remove_liquidity(&RemoveLiquidityRequest {
            token_a: token_a.clone(),
            token_b: token_b.clone(),
            lp_amount,
            min_amount_a,
            min_amount_b,
        })?;

        let _guard = SubmissionGuard::acquire(&self.submitting).ok_or(SwapError::SubmissionInFlight)?;
        info!("Removing {} LP from {}/{}", lp_amount, token_a.symbol, token_b.symbol);
        Ok(self.submit(&payload).await)
    }

    async fn submit(&self, payload: &crate::domain::execution::EntryFunctionPayload) -> TransactionResult {
        match self.bridge.sign_and_submit_transaction(payload).await {
            Ok(hash) => {
                info!("Liquidity transaction submitted: {}", hash);
                TransactionResult::submitted(hash)
            }
            Err(e) => {
                error!("Liquidity transaction failed: {}", e);
                TransactionResult::failed(e.to_string())
            }
        }
    }
}

fn positive_amount(input: &str) -> Result<Decimal, SwapError> {
    match parse_amount(input)? {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(SwapError::InvalidAmount(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::session::SessionEvent;
    use crate::infrastructure::provider::{ProviderSlot, SimulatedWallet};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn setup(pool: &str) -> (Arc<SimulatedWallet>, Arc<SessionStore>, PoolService) {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        wallet.set_connected(true);
        let store = Arc::new(SessionStore::new());
        let bridge = Arc::new(ProviderBridge::new(
            ProviderSlot::with_provider(wallet.clone()),
            Duration::from_secs(5),
        ));
        let service = PoolService::new(store.clone(), bridge, TransactionBuilder::new(pool), dec!(0.5));
        (wallet, store, service)
    }

    fn connect(store: &SessionStore) {
        let epoch = store.begin(SessionEvent::ConnectStarted);
        store.apply(
            epoch,
            SessionEvent::ConnectSucceeded {
                address: "0xabc".to_string(),
                chain_id: 6,
            },
        );
    }

    fn tradable(config: &Config) -> (Token, Token) {
        let supra = config.token("SUPRA").unwrap().clone();
        let usdc = Token {
            address: "0xcafe::usdc::USDC".to_string(),
            ..config.token("USDC").unwrap().clone()
        };
        (supra, usdc)
    }

    #[test]
    fn test_available_pools() {
        let config = Config::default();
        let (_, _, service) = setup("0xpool");
        let pools = service.available_pools(config.tokens());
        assert_eq!(pools.len(), config.tokens().len() - 1);
        assert_eq!(pools[0].name(), "SUPRA / USDC");
        assert_eq!(pools[0].fee, 0.3);
    }

    #[tokio::test]
    async fn test_add_liquidity_requires_connection() {
        let config = Config::default();
        let (supra, usdc) = tradable(&config);
        let (wallet, _, service) = setup("0xpool");

        let result = service.add_liquidity(&supra, &usdc, "1", "1").await;
        assert_eq!(result, Err(SwapError::Wallet(WalletError::WalletNotConnected)));
        assert!(wallet.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_add_liquidity_applies_slippage() {
        let config = Config::default();
        let (supra, usdc) = tradable(&config);
        let (wallet, store, service) = setup("0xpool");
        connect(&store);

        let result = service.add_liquidity(&supra, &usdc, "2", "3").await.unwrap();
        assert!(result.success);

        let submitted = wallet.submitted();
        assert_eq!(submitted[0].function, "0xpool::router::add_liquidity");
        assert_eq!(
            submitted[0].arguments,
            vec!["0xpool", "200000000", "3000000", "199000000", "2985000"]
        );
    }

    #[tokio::test]
    async fn test_undeployed_pool() {
        let config = Config::default();
        let (supra, usdc) = tradable(&config);
        let (_, store, service) = setup("");
        connect(&store);

        let result = service.add_liquidity(&supra, &usdc, "1", "1").await;
        assert_eq!(result, Err(SwapError::ContractNotDeployed));
    }

    #[tokio::test]
    async fn test_placeholder_token_is_not_tradable() {
        let config = Config::default();
        let (supra, _) = tradable(&config);
        let usdt = config.token("USDT").unwrap().clone();
        let (wallet, store, service) = setup("0xpool");
        connect(&store);

        let result = service.add_liquidity(&supra, &usdt, "1", "1").await;
        assert_eq!(result, Err(SwapError::TokenNotTradable("USDT".to_string())));
        assert!(wallet.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_remove_liquidity_rejection_is_a_failed_result() {
        let config = Config::default();
        let (supra, usdc) = tradable(&config);
        let (wallet, store, service) = setup("0xpool");
        connect(&store);
        wallet.reject_next("User rejected the request");

        let result = service
            .remove_liquidity(&supra, &usdc, 1_000, dec!(0), dec!(0))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("User rejected the request"));

        let result = service
            .remove_liquidity(&supra, &usdc, 1_000, dec!(0), dec!(0))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(wallet.submitted()[0].arguments, vec!["0xpool", "1000", "0", "0"]);
    }
}
