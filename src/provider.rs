//! Wallet provider capability.
//!
//! Everything that leaves the process goes through [`WalletProvider`]: account
//! access, read-only contract calls and signed transactions.

use serde::{Deserialize, Serialize};

use crate::{error::WalletResult, model::TxHash};

pub mod json_rpc;

pub use json_rpc::JsonRpcProvider;

/// A state-changing call, signed and sent by the wallet on behalf of `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for account access. The first account is the active one.
    fn request_accounts(
        &self,
    ) -> impl std::future::Future<Output = WalletResult<Vec<String>>> + Send;

    /// Read-only call against the latest block.
    fn call(
        &self,
        to: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = WalletResult<Vec<u8>>> + Send;

    fn send_transaction(
        &self,
        tx: &TransactionRequest,
    ) -> impl std::future::Future<Output = WalletResult<TxHash>> + Send;
}

/// `0x`-prefixed hex (de)serialization for call data.
pub mod hex_data {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn encode(data: &[u8]) -> String {
        format!("0x{}", hex::encode(data))
    }

    pub fn decode(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(value.strip_prefix("0x").unwrap_or(value))
    }

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        decode(&value).map_err(D::Error::custom)
    }
}
