//! Supra RPC client for balance reads

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::shared::errors::WalletError;

/// Native coin type tag
pub const SUPRA_COIN_TYPE: &str = "0x1::supra_coin::SupraCoin";

/// View function returning an account's coin balance
const COIN_BALANCE_FUNCTION: &str = "0x1::coin::balance";

/// Source of raw (base unit) coin balances
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn coin_balance(&self, address: &str, coin_type: &str) -> Result<String, WalletError>;
}

#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: Vec<&'a str>,
    arguments: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    result: Vec<Value>,
}

/// Supra RPC client wrapper
#[derive(Debug, Clone)]
pub struct SupraRpcClient {
    client: Client,
    rpc_url: String,
}

impl SupraRpcClient {
    /// Create new RPC client
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            rpc_url: rpc_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Call a Move view function
    pub async fn view(&self, function: &str, type_arguments: Vec<&str>, arguments: Vec<&str>) -> Result<Vec<Value>, WalletError> {
        let url = format!("{}/rpc/v1/view", self.rpc_url);
        debug!("POST {} {}", url, function);

        let response = self
            .client
            .post(&url)
            .json(&ViewRequest {
                function,
                type_arguments,
                arguments,
            })
            .send()
            .await
            .map_err(|e| WalletError::QueryFailed(format!("RPC request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WalletError::QueryFailed(format!("RPC returned {}", response.status())));
        }

        let body: ViewResponse = response
            .json()
            .await
            .map_err(|e| WalletError::QueryFailed(format!("Invalid RPC response: {}", e)))?;
        Ok(body.result)
    }
}

#[async_trait]
impl BalanceSource for SupraRpcClient {
    async fn coin_balance(&self, address: &str, coin_type: &str) -> Result<String, WalletError> {
        let result = self.view(COIN_BALANCE_FUNCTION, vec![coin_type], vec![address]).await?;
        parse_balance(&result)
    }
}

/// The balance comes back as a JSON string or number in the first slot
fn parse_balance(result: &[Value]) -> Result<String, WalletError> {
    match result.first() {
        Some(Value::String(s)) if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_u64() => Ok(n.to_string()),
        other => Err(WalletError::QueryFailed(format!("Unexpected balance value: {:?}", other))),
    }
}
