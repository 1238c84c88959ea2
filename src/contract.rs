//! ERC20 contract proxy and token binding.

use alloy_primitives::U256;
use tracing::{debug, info, warn};

use crate::{
    abi::{self, AbiError, Erc20Method},
    address::validate_address,
    error::{WalletError, WalletResult},
    model::{Field, TokenBinding, TxHash, INVALID_ADDRESS},
    provider::{TransactionRequest, WalletProvider},
    session::WalletSession,
    units::DEFAULT_DECIMALS,
    utils::conf::Conf,
};

fn decode_failure(method: Erc20Method, error: AbiError) -> WalletError {
    WalletError::call_failure(method.to_string(), error)
}

/// Callable view of an ERC20 contract at a validated address.
pub struct Erc20Contract<'a, P> {
    provider: &'a P,
    address: String,
}

impl<'a, P: WalletProvider> Erc20Contract<'a, P> {
    pub fn new(provider: &'a P, address: &str) -> WalletResult<Self> {
        if !validate_address(address) {
            return Err(WalletError::validation(
                Field::ContractAddress,
                INVALID_ADDRESS,
            ));
        }
        Ok(Erc20Contract {
            provider,
            address: address.to_string(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn read(&self, method: Erc20Method, data: Vec<u8>) -> WalletResult<Vec<u8>> {
        debug!("Calling {} on {}", method, self.address);
        self.provider
            .call(&self.address, &data)
            .await
            .map_err(|e| match e {
                WalletError::CallFailure { reason, .. } => {
                    WalletError::call_failure(method.to_string(), reason)
                }
                other => other,
            })
    }

    pub async fn name(&self) -> WalletResult<String> {
        let out = self.read(Erc20Method::Name, abi::encode_name()).await?;
        abi::decode_string(&out).map_err(|e| decode_failure(Erc20Method::Name, e))
    }

    pub async fn symbol(&self) -> WalletResult<String> {
        let out = self.read(Erc20Method::Symbol, abi::encode_symbol()).await?;
        abi::decode_string(&out).map_err(|e| decode_failure(Erc20Method::Symbol, e))
    }

    pub async fn decimals(&self) -> WalletResult<u8> {
        let out = self
            .read(Erc20Method::Decimals, abi::encode_decimals())
            .await?;
        abi::decode_u8(&out).map_err(|e| decode_failure(Erc20Method::Decimals, e))
    }

    pub async fn balance_of(&self, owner: &str) -> WalletResult<U256> {
        let data = abi::encode_balance_of(owner)
            .map_err(|e| decode_failure(Erc20Method::BalanceOf, e))?;
        let out = self.read(Erc20Method::BalanceOf, data).await?;
        abi::decode_uint(&out).map_err(|e| decode_failure(Erc20Method::BalanceOf, e))
    }

    /// Sends `transfer(recipient, amount)` signed by `from`.
    pub async fn transfer(&self, from: &str, recipient: &str, amount: U256) -> WalletResult<TxHash> {
        let data = abi::encode_transfer(recipient, amount)
            .map_err(|_| WalletError::validation(Field::Recipient, INVALID_ADDRESS))?;
        let tx = TransactionRequest {
            from: from.to_string(),
            to: self.address.clone(),
            data,
        };
        self.provider.send_transaction(&tx).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    pub query_decimals: bool,
    pub default_decimals: u8,
}

impl Default for BindOptions {
    fn default() -> Self {
        BindOptions {
            query_decimals: true,
            default_decimals: DEFAULT_DECIMALS,
        }
    }
}

impl From<&Conf> for BindOptions {
    fn from(conf: &Conf) -> Self {
        BindOptions {
            query_decimals: conf.query_decimals,
            default_decimals: conf.default_decimals,
        }
    }
}

/// Reads name, symbol and the session account's balance, one call after the
/// other, then the token decimals when asked to.
///
/// Any failed read fails the whole bind; no partial binding is produced.
/// Only a token whose `decimals()` reverts or returns garbage falls back to the
/// configured default; provider errors fail the bind like any other read.
pub async fn bind<P: WalletProvider>(
    session: &WalletSession<P>,
    address: &str,
    options: &BindOptions,
) -> WalletResult<TokenBinding> {
    let (provider, account) = session.connection().ok_or(WalletError::NotConnected)?;
    let contract = Erc20Contract::new(provider, address)?;

    let name = contract.name().await?;
    let symbol = contract.symbol().await?;
    let raw_balance = contract.balance_of(account).await?;
    let decimals = if options.query_decimals {
        match contract.decimals().await {
            Ok(decimals) => decimals,
            // Reverted or undecodable: the token has no usable decimals().
            Err(e @ WalletError::CallFailure { .. }) => {
                warn!(
                    "Token {} did not report decimals ({}), assuming {}",
                    address, e, options.default_decimals
                );
                options.default_decimals
            }
            Err(e) => return Err(e),
        }
    } else {
        options.default_decimals
    };

    info!("🪙 Bound token {} ({}) at {}", name, symbol, address);
    Ok(TokenBinding {
        contract_address: address.to_string(),
        name,
        symbol,
        raw_balance,
        decimals,
    })
}
