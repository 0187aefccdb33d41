//! Read-only chain access

pub mod rpc_client;

pub use rpc_client::{BalanceSource, SupraRpcClient};
