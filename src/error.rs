use derive_more::derive::Display;

use crate::model::Field;

pub type WalletResult<T> = Result<T, WalletError>;

/// Every failure a wallet action can run into.
///
/// None of them are fatal: each one is local to the user action that caused
/// it, and the state machines stay in their last stable state.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WalletError {
    /// A form field failed validation.
    #[display("invalid {field}: {reason}")]
    Validation { field: Field, reason: String },
    /// No wallet provider is reachable from this environment.
    #[display("wallet provider unavailable: {_0}")]
    ProviderUnavailable(String),
    /// A read or write call was rejected or returned garbage.
    #[display("{method} failed: {reason}")]
    CallFailure { method: String, reason: String },
    /// The user refused the request in the wallet.
    #[display("rejected by user: {_0}")]
    UserRejected(String),
    #[display("wallet is not connected")]
    NotConnected,
    #[display("a transfer is already being submitted")]
    Busy,
}

impl std::error::Error for WalletError {}

impl WalletError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        WalletError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn call_failure(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        WalletError::CallFailure {
            method: method.into(),
            reason: reason.to_string(),
        }
    }
}
