//! In-memory wallet provider serving a set of fake ERC20 contracts.

use std::{collections::HashMap, sync::Mutex};

use alloy_primitives::U256;

use crate::{
    abi::{self, Erc20Method, IERC20Calls},
    error::{WalletError, WalletResult},
    model::TxHash,
    provider::{TransactionRequest, WalletProvider},
};

#[derive(Debug, Clone, Default)]
pub struct MockToken {
    pub name: String,
    pub symbol: String,
    /// `None` behaves like a token without a `decimals()` function.
    pub decimals: Option<u8>,
    /// Returned by `decimals()` instead of a value, as a flaky provider would.
    pub decimals_error: Option<WalletError>,
    balances: HashMap<String, U256>,
}

impl MockToken {
    pub fn new(name: &str, symbol: &str) -> Self {
        MockToken {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: Some(18),
            decimals_error: None,
            balances: HashMap::new(),
        }
    }

    pub fn with_decimals(mut self, decimals: Option<u8>) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn failing_decimals(mut self, error: WalletError) -> Self {
        self.decimals_error = Some(error);
        self
    }

    pub fn with_balance(mut self, owner: &str, balance: U256) -> Self {
        self.balances.insert(owner.to_lowercase(), balance);
        self
    }

    pub fn balance_of(&self, owner: &str) -> U256 {
        self.balances
            .get(&owner.to_lowercase())
            .copied()
            .unwrap_or(U256::ZERO)
    }
}

pub struct MockProvider {
    accounts: WalletResult<Vec<String>>,
    tokens: HashMap<String, MockToken>,
    transfer_error: Option<WalletError>,
    calls: Mutex<Vec<Erc20Method>>,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl MockProvider {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        MockProvider {
            accounts: Ok(accounts.iter().map(|a| a.to_string()).collect()),
            tokens: HashMap::new(),
            transfer_error: None,
            calls: Mutex::new(vec![]),
            sent: Mutex::new(vec![]),
        }
    }

    /// A provider whose account request always fails with `error`.
    pub fn rejecting(error: WalletError) -> Self {
        MockProvider {
            accounts: Err(error),
            ..Self::with_accounts(&[])
        }
    }

    pub fn with_token(mut self, address: &str, token: MockToken) -> Self {
        self.tokens.insert(address.to_lowercase(), token);
        self
    }

    /// Every `send_transaction` fails with `error` after being recorded.
    pub fn failing_transfers(mut self, error: WalletError) -> Self {
        self.transfer_error = Some(error);
        self
    }

    /// Read calls served so far, in order.
    pub fn calls(&self) -> Vec<Erc20Method> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        self.accounts.clone()
    }

    async fn call(&self, to: &str, data: &[u8]) -> WalletResult<Vec<u8>> {
        let token = self
            .tokens
            .get(&to.to_lowercase())
            .ok_or_else(|| WalletError::call_failure("eth_call", format!("no contract at {to}")))?;
        let call = abi::decode_call(data).map_err(|e| WalletError::call_failure("eth_call", e))?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Erc20Method::from(&call));
        }

        match call {
            IERC20Calls::name(_) => Ok(abi::encode_string(&token.name)),
            IERC20Calls::symbol(_) => Ok(abi::encode_string(&token.symbol)),
            IERC20Calls::decimals(_) => {
                if let Some(error) = &token.decimals_error {
                    return Err(error.clone());
                }
                token
                    .decimals
                    .map(abi::encode_u8)
                    .ok_or_else(|| WalletError::call_failure("eth_call", "execution reverted"))
            }
            IERC20Calls::balanceOf(call) => Ok(abi::encode_uint(
                token.balance_of(&call.account.to_string()),
            )),
            IERC20Calls::transfer(_) => Err(WalletError::call_failure(
                "eth_call",
                "transfer must be sent as a transaction",
            )),
        }
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> WalletResult<TxHash> {
        let index = match self.sent.lock() {
            Ok(mut sent) => {
                sent.push(tx.clone());
                sent.len()
            }
            Err(_) => 0,
        };
        if let Some(error) = &self.transfer_error {
            return Err(error.clone());
        }
        Ok(TxHash(format!("0x{index:064x}")))
    }
}
