//! # CoinX
//!
//! *Send ERC20 tokens from a connected wallet.*
//!
//! The crate connects to a wallet provider, reads an ERC20 token's name, symbol
//! and the account balance, and submits `transfer` transactions. The provider is
//! an injected [`provider::WalletProvider`]; [`provider::JsonRpcProvider`] talks
//! JSON-RPC to a node or signer, [`tools::mock_provider::MockProvider`] serves
//! fake tokens for tests.
//!
//! State is explicit: a [`session::WalletSession`] holds the connected account
//! and is passed to the [`contract`] binder and the [`transfer::TransferForm`].

pub mod abi;
pub mod address;
pub mod contract;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod tools;
pub mod transfer;
pub mod units;
pub mod utils;
