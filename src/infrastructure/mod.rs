//! Infrastructure layer - wallet provider, chain RPC and local storage

pub mod blockchain;
pub mod provider;
pub mod storage;
