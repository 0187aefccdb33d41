//! Displayed token balances for the connected account

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::infrastructure::blockchain::BalanceSource;
use crate::shared::types::Token;
use crate::shared::utils::format_balance;

/// Shown for tokens never read, or not readable
pub const UNKNOWN_BALANCE: &str = "0.00";

pub struct BalanceBook {
    source: Arc<dyn BalanceSource>,
    tokens: Vec<Token>,
    balances: RwLock<HashMap<String, String>>,
    /// Generation of the refresh in progress, 0 when idle
    loading: AtomicU64,
    generation: AtomicU64,
}

impl BalanceBook {
    /// `tokens` are the ones read on refresh; any other symbol shows
    /// [`UNKNOWN_BALANCE`]
    pub fn new(source: Arc<dyn BalanceSource>, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            balances: RwLock::new(HashMap::new()),
            loading: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// True while the latest refresh is running. A refresh overtaken by a
    /// newer one or by [`BalanceBook::clear`] no longer counts.
    pub fn is_loading(&self) -> bool {
        let loading = self.loading.load(Ordering::SeqCst);
        loading != 0 && loading == self.generation.load(Ordering::SeqCst)
    }

    pub async fn balance(&self, symbol: &str) -> String {
        self.balances
            .read()
            .await
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_BALANCE.to_string())
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        let balances = self.balances.read().await;
        self.tokens
            .iter()
            .map(|t| {
                let shown = balances.get(&t.symbol).cloned().unwrap_or_else(|| UNKNOWN_BALANCE.to_string());
                (t.symbol.clone(), shown)
            })
            .collect()
    }

    /// Forget everything, e.g. after disconnect
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.balances.write().await.clear();
    }

    /// Re-read every token for `address`. A failed read keeps the
    /// previous value. Results of a refresh overtaken by a newer one are
    /// dropped. Returns how many balances were updated.
    pub async fn refresh(&self, address: &str) -> usize {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.store(generation, Ordering::SeqCst);

        let mut updated = 0;
        for token in &self.tokens {
            match self.source.coin_balance(address, &token.address).await {
                Ok(raw) => {
                    if self.generation.load(Ordering::SeqCst) != generation {
                        debug!("Balance refresh for {} superseded", address);
                        return updated;
                    }
                    let shown = format_balance(&raw, token.decimals);
                    self.balances.write().await.insert(token.symbol.clone(), shown);
                    updated += 1;
                }
                Err(e) => warn!("Failed to get {} balance for {}: {}", token.symbol, address, e),
            }
        }

        let _ = self
            .loading
            .compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::shared::errors::WalletError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// Balances keyed by (address, coin type)
    #[derive(Default)]
    struct StubSource {
        balances: Mutex<HashMap<(String, String), String>>,
    }

    impl StubSource {
        fn set(&self, address: &str, coin_type: &str, raw: &str) {
            self.balances
                .lock()
                .unwrap()
                .insert((address.to_string(), coin_type.to_string()), raw.to_string());
        }
    }

    #[async_trait]
    impl BalanceSource for StubSource {
        async fn coin_balance(&self, address: &str, coin_type: &str) -> Result<String, WalletError> {
            self.balances
                .lock()
                .unwrap()
                .get(&(address.to_string(), coin_type.to_string()))
                .cloned()
                .ok_or_else(|| WalletError::QueryFailed("account not found".to_string()))
        }
    }

    fn book(source: Arc<dyn BalanceSource>) -> BalanceBook {
        BalanceBook::new(source, Config::default().tradable_tokens().cloned().collect())
    }

    #[tokio::test]
    async fn test_unread_balances_default() {
        let book = book(Arc::new(StubSource::default()));
        let snapshot = book.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["SUPRA"], UNKNOWN_BALANCE);
        assert_eq!(book.balance("USDT").await, UNKNOWN_BALANCE);
    }

    #[tokio::test]
    async fn test_refresh_formats_native_balance() {
        let source = Arc::new(StubSource::default());
        source.set("0xabc", "0x1::supra_coin::SupraCoin", "150000000");
        let book = book(source);

        // placeholder tokens are never queried
        assert_eq!(book.refresh("0xabc").await, 1);
        assert_eq!(book.balance("SUPRA").await, "1.5000");
        assert_eq!(book.balance("USDC").await, UNKNOWN_BALANCE);
        assert!(!book.is_loading());
    }

    #[tokio::test]
    async fn test_failed_read_keeps_last_value() {
        let source = Arc::new(StubSource::default());
        source.set("0xabc", "0x1::supra_coin::SupraCoin", "100000000");
        let book = book(source);
        book.refresh("0xabc").await;

        assert_eq!(book.refresh("0xdead").await, 0);
        assert_eq!(book.balance("SUPRA").await, "1.0000");

        book.clear().await;
        assert_eq!(book.balance("SUPRA").await, UNKNOWN_BALANCE);
    }

    /// Answers one read per released permit
    struct GatedSource {
        gate: Semaphore,
    }

    #[async_trait]
    impl BalanceSource for GatedSource {
        async fn coin_balance(&self, _address: &str, _coin_type: &str) -> Result<String, WalletError> {
            self.gate
                .acquire()
                .await
                .map_err(|e| WalletError::QueryFailed(e.to_string()))?
                .forget();
            Ok("100000000".to_string())
        }
    }

    #[tokio::test]
    async fn test_clear_during_refresh_ends_loading() {
        let source = Arc::new(GatedSource { gate: Semaphore::new(0) });
        let book = Arc::new(book(source.clone()));

        let pending = tokio::spawn({
            let book = book.clone();
            async move { book.refresh("0xabc").await }
        });
        while !book.is_loading() {
            tokio::task::yield_now().await;
        }

        book.clear().await;
        assert!(!book.is_loading());

        source.gate.add_permits(1);
        assert_eq!(pending.await.unwrap(), 0);
        assert!(!book.is_loading());
        assert_eq!(book.balance("SUPRA").await, UNKNOWN_BALANCE);

        // a later refresh still reports and clears its own loading state
        source.gate.add_permits(1);
        assert_eq!(book.refresh("0xabc").await, 1);
        assert!(!book.is_loading());
        assert_eq!(book.balance("SUPRA").await, "1.0000");
    }
}
