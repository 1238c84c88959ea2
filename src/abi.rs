//! ERC20 bindings.
//!
//! Call data and return data go through the `sol!` generated types; this
//! module only adds address parsing and the legacy `bytes32` string form.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall, SolInterface};
use derive_more::derive::Display;

use crate::address::validate_address;

sol! {
    /// The subset of the ERC20 interface the wallet talks to
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub use IERC20::IERC20Calls;

#[derive(Debug, Display)]
pub enum AbiError {
    #[display("invalid address {_0}")]
    InvalidAddress(String),
    #[display("{_0}")]
    Decode(alloy_sol_types::Error),
    #[display("string is not valid utf-8")]
    InvalidUtf8,
}

impl std::error::Error for AbiError {}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(value: alloy_sol_types::Error) -> Self {
        AbiError::Decode(value)
    }
}

/// Names the ERC20 functions, for logs, errors and call records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Erc20Method {
    #[display("name")]
    Name,
    #[display("symbol")]
    Symbol,
    #[display("decimals")]
    Decimals,
    #[display("balanceOf")]
    BalanceOf,
    #[display("transfer")]
    Transfer,
}

impl Erc20Method {
    pub fn signature(&self) -> &'static str {
        match self {
            Erc20Method::Name => IERC20::nameCall::SIGNATURE,
            Erc20Method::Symbol => IERC20::symbolCall::SIGNATURE,
            Erc20Method::Decimals => IERC20::decimalsCall::SIGNATURE,
            Erc20Method::BalanceOf => IERC20::balanceOfCall::SIGNATURE,
            Erc20Method::Transfer => IERC20::transferCall::SIGNATURE,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            Erc20Method::Name => IERC20::nameCall::SELECTOR,
            Erc20Method::Symbol => IERC20::symbolCall::SELECTOR,
            Erc20Method::Decimals => IERC20::decimalsCall::SELECTOR,
            Erc20Method::BalanceOf => IERC20::balanceOfCall::SELECTOR,
            Erc20Method::Transfer => IERC20::transferCall::SELECTOR,
        }
    }
}

impl From<&IERC20Calls> for Erc20Method {
    fn from(call: &IERC20Calls) -> Self {
        match call {
            IERC20Calls::name(_) => Erc20Method::Name,
            IERC20Calls::symbol(_) => Erc20Method::Symbol,
            IERC20Calls::decimals(_) => Erc20Method::Decimals,
            IERC20Calls::balanceOf(_) => Erc20Method::BalanceOf,
            IERC20Calls::transfer(_) => Erc20Method::Transfer,
        }
    }
}

pub fn parse_address(address: &str) -> Result<Address, AbiError> {
    if !validate_address(address) {
        return Err(AbiError::InvalidAddress(address.to_string()));
    }
    address
        .parse()
        .map_err(|_| AbiError::InvalidAddress(address.to_string()))
}

pub fn encode_name() -> Vec<u8> {
    IERC20::nameCall {}.abi_encode()
}

pub fn encode_symbol() -> Vec<u8> {
    IERC20::symbolCall {}.abi_encode()
}

pub fn encode_decimals() -> Vec<u8> {
    IERC20::decimalsCall {}.abi_encode()
}

pub fn encode_balance_of(owner: &str) -> Result<Vec<u8>, AbiError> {
    Ok(IERC20::balanceOfCall {
        account: parse_address(owner)?,
    }
    .abi_encode())
}

pub fn encode_transfer(recipient: &str, amount: U256) -> Result<Vec<u8>, AbiError> {
    Ok(IERC20::transferCall {
        to: parse_address(recipient)?,
        amount,
    }
    .abi_encode())
}

/// Return data of `name()`/`symbol()`.
pub fn encode_string(value: &str) -> Vec<u8> {
    IERC20::nameCall::abi_encode_returns(&(value.to_string(),))
}

/// Return data of `balanceOf()`.
pub fn encode_uint(value: U256) -> Vec<u8> {
    IERC20::balanceOfCall::abi_encode_returns(&(value,))
}

/// Return data of `decimals()`.
pub fn encode_u8(value: u8) -> Vec<u8> {
    IERC20::decimalsCall::abi_encode_returns(&(value,))
}

pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    Ok(IERC20::balanceOfCall::abi_decode_returns(data, true)?._0)
}

pub fn decode_u8(data: &[u8]) -> Result<u8, AbiError> {
    Ok(IERC20::decimalsCall::abi_decode_returns(data, true)?._0)
}

/// Decodes a `string` return value.
///
/// Some early tokens declare `name`/`symbol` as `bytes32`; a bare single word
/// is read that way, up to the first NUL byte.
pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    if data.len() == 32 {
        let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
        return String::from_utf8(data[..end].to_vec()).map_err(|_| AbiError::InvalidUtf8);
    }
    Ok(IERC20::nameCall::abi_decode_returns(data, true)?._0)
}

pub fn decode_call(data: &[u8]) -> Result<IERC20Calls, AbiError> {
    Ok(IERC20Calls::abi_decode(data, true)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::assert_err;

    const HOLDER: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    #[test]
    fn selectors_match_the_erc20_standard() {
        assert_eq!(hex::encode(Erc20Method::Name.selector()), "06fdde03");
        assert_eq!(hex::encode(Erc20Method::Symbol.selector()), "95d89b41");
        assert_eq!(hex::encode(Erc20Method::Decimals.selector()), "313ce567");
        assert_eq!(hex::encode(Erc20Method::BalanceOf.selector()), "70a08231");
        assert_eq!(hex::encode(Erc20Method::Transfer.selector()), "a9059cbb");
        assert_eq!(
            Erc20Method::Transfer.signature(),
            "transfer(address,uint256)"
        );
    }

    #[test]
    fn encodes_balance_of_with_padded_owner() {
        let data = encode_balance_of(HOLDER).unwrap();
        assert_eq!(
            hex::encode(&data),
            "70a08231000000000000000000000000abcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn transfer_call_decodes_back() {
        let amount = U256::from(1_000_000_000_000_000_000u128);
        let data = encode_transfer(HOLDER, amount).unwrap();
        assert_eq!(data.len(), 4 + 2 * 32);

        let call = decode_call(&data).unwrap();
        assert_eq!(Erc20Method::from(&call), Erc20Method::Transfer);
        let IERC20Calls::transfer(transfer) = call else {
            panic!("expected a transfer call");
        };
        assert_eq!(transfer.to, parse_address(HOLDER).unwrap());
        assert_eq!(transfer.amount, amount);
    }

    #[test]
    fn rejects_bad_addresses() {
        assert!(matches!(
            encode_balance_of("0x1234"),
            Err(AbiError::InvalidAddress(a)) if a == "0x1234"
        ));
    }

    #[test]
    fn decodes_dynamic_and_bytes32_strings() {
        assert_eq!(decode_string(&encode_string("Token")).unwrap(), "Token");
        let long = "A token with a name longer than one word";
        assert_eq!(decode_string(&encode_string(long)).unwrap(), long);

        let mut legacy = [0u8; 32];
        legacy[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_string(&legacy).unwrap(), "MKR");
    }

    #[test]
    fn rejects_truncated_return_data() {
        let mut data = encode_string("Token");
        data.truncate(2 * 32 + 2);
        assert_err!(decode_string(&data));
        assert_err!(decode_uint(&[0u8; 4]));
        assert_err!(decode_string(&[]));
    }

    #[test]
    fn decodes_small_integers() {
        assert_eq!(decode_u8(&encode_u8(18)).unwrap(), 18);
        assert_eq!(
            decode_uint(&encode_uint(U256::from(42u8))).unwrap(),
            U256::from(42u8)
        );
    }

    #[test]
    fn unknown_selector_is_reported() {
        assert_err!(decode_call(&[0xde, 0xad, 0xbe, 0xef]));
    }
}
