//! Application layer - use cases and services

pub mod balances;
pub mod commands;
pub mod pool_service;
pub mod swap_service;
pub mod wallet_service;

pub use balances::BalanceBook;
pub use pool_service::PoolService;
pub use swap_service::SwapService;
pub use wallet_service::WalletService;

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the in-flight flag for the lifetime of one submission
pub(crate) struct SubmissionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SubmissionGuard<'a> {
    /// `None` while another submission holds the flag
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
