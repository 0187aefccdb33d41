//! Quote / execute flow for the swap form

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::domain::execution::{SwapRequest, TransactionBuilder};
use crate::domain::pricing::{quote_input, PricingProvider, SwapQuote};
use crate::domain::session::SessionStore;
use crate::domain::swap::{Side, SwapAction, SwapForm};
use crate::infrastructure::provider::ProviderBridge;
use crate::math::{calculate_min_out, format_fixed, parse_amount, OUTPUT_DISPLAY_DP};
use crate::shared::errors::{SwapError, WalletError};
use crate::shared::types::{Token, TransactionResult};
use super::SubmissionGuard;

/// A quote together with the session revision it was computed under
#[derive(Debug, Clone)]
struct QuoteSnapshot {
    quote: SwapQuote,
    session_revision: u64,
}

pub struct SwapService {
    store: Arc<SessionStore>,
    bridge: Arc<ProviderBridge>,
    pricing: Arc<dyn PricingProvider>,
    builder: TransactionBuilder,
    form: Mutex<SwapForm>,
    quote: Mutex<Option<QuoteSnapshot>>,
    quote_seq: AtomicU64,
    submitting: AtomicBool,
}

impl SwapService {
    pub fn new(
        store: Arc<SessionStore>,
        bridge: Arc<ProviderBridge>,
        pricing: Arc<dyn PricingProvider>,
        builder: TransactionBuilder,
        form: SwapForm,
    ) -> Self {
        Self {
            store,
            bridge,
            pricing,
            builder,
            form: Mutex::new(form),
            quote: Mutex::new(None),
            quote_seq: AtomicU64::new(0),
            submitting: AtomicBool::new(false),
        }
    }

    fn lock_form(&self) -> MutexGuard<'_, SwapForm> {
        self.form.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_quote(&self) -> MutexGuard<'_, Option<QuoteSnapshot>> {
        self.quote.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn form(&self) -> SwapForm {
        self.lock_form().clone()
    }

    pub fn current_quote(&self) -> Option<SwapQuote> {
        self.lock_quote().as_ref().map(|snapshot| snapshot.quote.clone())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn action(&self) -> SwapAction {
        let connected = self.store.snapshot().is_connected();
        self.lock_form().action(connected, self.is_submitting())
    }

    pub async fn set_amount_in(&self, amount: &str) -> Result<Option<SwapQuote>, SwapError> {
        self.lock_form().set_from_amount(amount);
        self.refresh_quote().await
    }

    /// Fails with [`SwapError::IdenticalTokens`] when the form refuses the
    /// pick, e.g. the input token as output with nothing to swap it with
    pub async fn select_token(&self, side: Side, token: Token) -> Result<Option<SwapQuote>, SwapError> {
        let symbol = token.symbol.clone();
        if !self.lock_form().select_token(side, token) {
            return Err(SwapError::IdenticalTokens(symbol));
        }
        self.refresh_quote().await
    }

    /// Exchange direction atomically, then re-quote the new input
    pub async fn flip(&self) -> Result<Option<SwapQuote>, SwapError> {
        if !self.lock_form().flip() {
            return Ok(self.current_quote());
        }
        self.refresh_quote().await
    }

    pub async fn use_max(&self, balance: &str) -> Result<Option<SwapQuote>, SwapError> {
        self.lock_form().use_max(balance);
        self.refresh_quote().await
    }

    pub fn set_slippage_pct(&self, slippage_pct: Decimal) {
        self.lock_form().set_slippage_pct(slippage_pct);
    }

    /// Recompute the quote for the current form.
    ///
    /// `Ok(None)` when there is nothing to quote, or when a newer input change
    /// started another computation before this one finished.
    pub async fn refresh_quote(&self) -> Result<Option<SwapQuote>, SwapError> {
        let seq = self.quote_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let session_revision = self.store.revision();
        let form = self.form();

        let result = quote_input(self.pricing.as_ref(), form.from_token(), form.to_token(), form.from_amount()).await;

        if self.quote_seq.load(Ordering::SeqCst) != seq {
            debug!("Discarding superseded quote #{}", seq);
            return Ok(None);
        }

        let mut form = self.lock_form();
        let mut slot = self.lock_quote();
        match result {
            Ok(Some(quote)) => {
                form.set_to_amount(format_fixed(quote.amount_out, OUTPUT_DISPLAY_DP));
                *slot = Some(QuoteSnapshot {
                    quote: quote.clone(),
                    session_revision,
                });
                Ok(Some(quote))
            }
            Ok(None) => {
                form.set_to_amount("");
                *slot = None;
                Ok(None)
            }
            Err(e) => {
                form.set_to_amount("");
                *slot = None;
                Err(e)
            }
        }
    }

    /// Quote to execute against: the cached one if the session and the
    /// inputs are unchanged since it was computed, a fresh one otherwise
    async fn quote_for_execution(&self, token_in: &Token, token_out: &Token, amount_in: Decimal) -> Result<SwapQuote, SwapError> {
        let cached = self.lock_quote().clone();
        if let Some(snapshot) = cached {
            let same_session = snapshot.session_revision == self.store.revision();
            let same_inputs = snapshot.quote.amount_in == amount_in
                && snapshot.quote.route == [token_in.symbol.clone(), token_out.symbol.clone()];
            if same_session && same_inputs {
                return Ok(snapshot.quote);
            }
            debug!("Cached quote invalidated, re-quoting before submit");
        }
        self.pricing.quote(token_in, token_out, amount_in).await
    }

    /// Submit the swap in the form.
    ///
    /// Preconditions fail with `Err` before anything is built or sent. Once
    /// the wallet is involved the outcome is a [`TransactionResult`]: success
    /// clears the amounts unless they were edited meanwhile, failure leaves
    /// them for a retry.
    pub async fn execute(&self) -> Result<TransactionResult, SwapError> {
        if !self.store.snapshot().is_connected() {
            return Err(SwapError::Wallet(WalletError::WalletNotConnected));
        }

        let form = self.form();
        let token_out = form.to_token().cloned().ok_or(SwapError::TokenNotSelected)?;
        let token_in = form.from_token().clone();
        let amount_in = match parse_amount(form.from_amount())? {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return Err(SwapError::InvalidAmount(form.from_amount().to_string())),
        };

        let _guard = SubmissionGuard::acquire(&self.submitting).ok_or(SwapError::SubmissionInFlight)?;

        let quote = self.quote_for_execution(&token_in, &token_out, amount_in).await?;
        let min_amount_out = calculate_min_out(quote.amount_out, form.slippage_pct());

        let payload = self.builder.build_swap(&SwapRequest {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in,
            min_amount_out,
        })?;

        info!(
            "Swapping {} {} for {} (min {})",
            amount_in, token_in.symbol, token_out.symbol, min_amount_out
        );

        match self.bridge.sign_and_submit_transaction(&payload).await {
            Ok(hash) => {
                info!("Swap submitted: {}", hash);
                let mut live = self.lock_form();
                if live.from_amount() == form.from_amount() {
                    // outstanding quotes are for the amount just spent
                    self.quote_seq.fetch_add(1, Ordering::SeqCst);
                    live.clear_amounts();
                    *self.lock_quote() = None;
                }
                Ok(TransactionResult::submitted(hash))
            }
            Err(e) => {
                error!("Swap failed: {}", e);
                Ok(TransactionResult::failed(e.to_string()))
            }
        }
    }
}
