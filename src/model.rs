//! Various data structures

use alloy_primitives::U256;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

use crate::units;

pub const INVALID_ADDRESS: &str = "Invalid address";
pub const INVALID_AMOUNT: &str = "Amount must be greater than 0";
pub const READ_FAILURE: &str = "Could not read token contract";
pub const TOKEN_NOT_LOADED: &str = "Token details not loaded";

/// The three inputs of the transfer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    #[display("contractAddress")]
    ContractAddress,
    #[display("recipient")]
    Recipient,
    #[display("transferAmount")]
    TransferAmount,
}

impl Field {
    pub const ALL: [Field; 3] = [
        Field::ContractAddress,
        Field::Recipient,
        Field::TransferAmount,
    ];
}

/// Per-field error messages. An empty string means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub contract_address: String,
    pub recipient: String,
    pub transfer_amount: String,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ContractAddress => &self.contract_address,
            Field::Recipient => &self.recipient,
            Field::TransferAmount => &self.transfer_amount,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::ContractAddress => &mut self.contract_address,
            Field::Recipient => &mut self.recipient,
            Field::TransferAmount => &mut self.transfer_amount,
        }
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        *self.slot(field) = message.into();
    }

    pub fn clear(&mut self, field: Field) {
        self.slot(field).clear();
    }

    pub fn has_error(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| !self.has_error(*field))
    }

    /// Fields currently carrying an error, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
            .filter(|(_, message)| !message.is_empty())
    }
}

/// Metadata and balance read from an ERC20 contract for the connected account.
///
/// A binding belongs to exactly one contract address; it is dropped as soon as
/// the address it was read for changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBinding {
    pub contract_address: String,
    pub name: String,
    pub symbol: String,
    /// Balance in base units.
    pub raw_balance: U256,
    pub decimals: u8,
}

impl TokenBinding {
    pub fn is_for(&self, contract_address: &str) -> bool {
        self.contract_address.eq_ignore_ascii_case(contract_address)
    }

    /// Balance converted to a human amount, e.g. `1.5`.
    pub fn display_balance(&self) -> String {
        units::from_base_units(self.raw_balance, self.decimals)
    }
}

/// Transaction hash as returned by the wallet provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct TxHash(pub String);
