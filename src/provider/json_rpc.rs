use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{hex_data, TransactionRequest, WalletProvider};
use crate::{
    error::{WalletError, WalletResult},
    model::TxHash,
    utils::conf::Conf,
};

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

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
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

enum RpcFailure {
    Transport(reqwest::Error),
    Rpc(RpcError),
    Malformed(String),
}

impl RpcFailure {
    fn into_wallet_error(self, method: &str) -> WalletError {
        match self {
            RpcFailure::Transport(e) if e.is_connect() => {
                WalletError::ProviderUnavailable(e.to_string())
            }
            RpcFailure::Transport(e) => WalletError::call_failure(method, e),
            RpcFailure::Rpc(e) if e.code == USER_REJECTED_CODE => {
                WalletError::UserRejected(e.message)
            }
            RpcFailure::Rpc(e) => {
                WalletError::call_failure(method, format!("{} (code {})", e.message, e.code))
            }
            RpcFailure::Malformed(reason) => WalletError::call_failure(method, reason),
        }
    }
}

/// Wallet provider reached over JSON-RPC on HTTP: a node with unlocked
/// accounts, or a signer proxy in front of one.
pub struct JsonRpcProvider {
    pub url: Url,
    pub reqwest_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url).context(format!("parsing RPC url {url}"))?,
            reqwest_client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The provider configured for this environment, if any.
    pub fn detect(conf: &Conf) -> Result<Option<Self>> {
        match conf.rpc_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::new(url).map(Some),
            None => {
                warn!("No RPC url configured, no wallet provider available");
                Ok(None)
            }
        }
    }

    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, method, "Sending JSON-RPC request");

        let response = self
            .reqwest_client
            .post(self.url.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(RpcFailure::Transport)?;

        let status = response.status();
        let body = match response.json::<RpcResponse>().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(RpcFailure::Malformed(format!("HTTP {status}")))
            }
            Err(e) => return Err(RpcFailure::Malformed(format!("malformed response: {e}"))),
        };

        match (body.error, body.result) {
            (Some(error), _) => {
                debug!(id, method, code = error.code, "JSON-RPC error: {}", error.message);
                Err(RpcFailure::Rpc(error))
            }
            (None, Some(result)) => Ok(result),
            (None, None) => Err(RpcFailure::Malformed("empty response".to_string())),
        }
    }

    async fn request<T>(&self, method: &str, params: Value) -> WalletResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .raw_request(method, params)
            .await
            .map_err(|e| e.into_wallet_error(method))?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::call_failure(method, format!("unexpected result: {e}")))
    }
}

impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        match self.raw_request("eth_requestAccounts", json!([])).await {
            Ok(result) => serde_json::from_value(result).map_err(|e| {
                WalletError::call_failure("eth_requestAccounts", format!("unexpected result: {e}"))
            }),
            // Plain nodes only know about their unlocked accounts.
            Err(RpcFailure::Rpc(e)) if e.code == METHOD_NOT_FOUND_CODE => {
                debug!("eth_requestAccounts not supported, falling back to eth_accounts");
                self.request("eth_accounts", json!([])).await
            }
            Err(e) => Err(e.into_wallet_error("eth_requestAccounts")),
        }
    }

    async fn call(&self, to: &str, data: &[u8]) -> WalletResult<Vec<u8>> {
        let params = json!([{ "to": to, "data": hex_data::encode(data) }, "latest"]);
        let result: String = self.request("eth_call", params).await?;
        hex_data::decode(&result)
            .map_err(|e| WalletError::call_failure("eth_call", format!("invalid hex result: {e}")))
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> WalletResult<TxHash> {
        let params = serde_json::to_value(tx)
            .map_err(|e| WalletError::call_failure("eth_sendTransaction", e))?;
        let hash: String = self.request("eth_sendTransaction", json!([params])).await?;
        Ok(TxHash(hash))
    }
}
