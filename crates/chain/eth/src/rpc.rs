//! Minimal JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mint_chain_core::{ContractError, WalletError};

/// EIP-1193 error code for a user-rejected request.
const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC transport and protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Shared HTTP JSON-RPC client.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a single JSON-RPC call.
    ///
    /// The result may legitimately be JSON `null` (e.g. a pending
    /// transaction receipt); callers decide how to interpret it.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!(method, id, "rpc call");

        let response = self.http.post(&self.url).json(&request).send().await?;
        let body: RpcResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result)
    }
}

/// Map an RPC failure onto the wallet error taxonomy.
pub(crate) fn wallet_error(err: RpcError) -> WalletError {
    match err {
        RpcError::Rpc {
            code: USER_REJECTED_CODE,
            ..
        } => WalletError::UserRejected,
        other => WalletError::Network(other.to_string()),
    }
}

/// Map an RPC failure onto the contract error taxonomy.
pub(crate) fn contract_error(err: RpcError) -> ContractError {
    match err {
        RpcError::Rpc {
            code: USER_REJECTED_CODE,
            ..
        } => ContractError::TxRejected,
        RpcError::Rpc { message, .. } if message.contains("revert") => {
            ContractError::TxReverted(message)
        }
        other => ContractError::Network(other.to_string()),
    }
}
