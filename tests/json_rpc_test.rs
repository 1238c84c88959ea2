#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use axum::{extract::State, routing::post, Json, Router};
use coinx::{
    abi::{self, IERC20Calls},
    contract::{bind, BindOptions},
    error::WalletError,
    provider::{hex_data, JsonRpcProvider, WalletProvider},
    session::WalletSession,
    transfer::TransferForm,
};
use serde_json::{json, Value};

const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

#[derive(Default)]
struct MockNode {
    /// Behave like a wallet (eth_requestAccounts) rather than a plain node.
    wallet_methods: bool,
    reject_accounts: bool,
    reject_transactions: bool,
}

fn rpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

fn rpc_result(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

async fn handle(State(node): State<Arc<MockNode>>, Json(request): Json<Value>) -> Json<Value> {
    let id = &request["id"];
    let params = &request["params"];
    let response = match request["method"].as_str().unwrap_or_default() {
        "eth_requestAccounts" if !node.wallet_methods => rpc_error(id, -32601, "Method not found"),
        "eth_requestAccounts" if node.reject_accounts => {
            rpc_error(id, 4001, "User rejected the request.")
        }
        "eth_requestAccounts" | "eth_accounts" => rpc_result(id, json!([ACCOUNT])),
        "eth_call" => {
            assert_eq!(params[1], "latest");
            if params[0]["to"] != TOKEN {
                rpc_result(id, json!("0x"))
            } else {
                let data = hex_data::decode(params[0]["data"].as_str().unwrap()).unwrap();
                let out = match abi::decode_call(&data).unwrap() {
                    IERC20Calls::name(_) => abi::encode_string("Token"),
                    IERC20Calls::symbol(_) => abi::encode_string("TKN"),
                    IERC20Calls::decimals(_) => abi::encode_u8(18),
                    IERC20Calls::balanceOf(call) => {
                        assert_eq!(call.account, ACCOUNT.parse::<Address>().unwrap());
                        abi::encode_uint(U256::from(1_000_000_000_000_000_000u128))
                    }
                    IERC20Calls::transfer(_) => vec![],
                };
                rpc_result(id, json!(hex_data::encode(&out)))
            }
        }
        "eth_sendTransaction" if node.reject_transactions => {
            rpc_error(id, 4001, "User denied transaction signature.")
        }
        "eth_sendTransaction" => {
            assert_eq!(params[0]["from"], ACCOUNT);
            assert_eq!(params[0]["to"], TOKEN);
            rpc_result(id, json!(format!("0x{}", "ab".repeat(32))))
        }
        _ => rpc_error(id, -32601, "Method not found"),
    };
    Json(response)
}

async fn spawn_node(node: MockNode) -> String {
    let app = Router::new()
        .route("/", post(handle))
        .with_state(Arc::new(node));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

#[test_log::test(tokio::test)]
async fn falls_back_to_eth_accounts_on_plain_nodes() {
    let url = spawn_node(MockNode::default()).await;
    let provider = JsonRpcProvider::new(&url).unwrap();

    assert_eq!(provider.request_accounts().await.unwrap(), vec![ACCOUNT]);
}

#[test_log::test(tokio::test)]
async fn user_rejection_is_mapped() {
    let url = spawn_node(MockNode {
        wallet_methods: true,
        reject_accounts: true,
        ..Default::default()
    })
    .await;
    let mut session = WalletSession::new();

    let err = session
        .connect(Some(JsonRpcProvider::new(&url).unwrap()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WalletError::UserRejected("User rejected the request.".into())
    );
    assert!(!session.is_connected());
}

#[test_log::test(tokio::test)]
async fn binds_and_transfers_over_json_rpc() {
    let url = spawn_node(MockNode {
        wallet_methods: true,
        ..Default::default()
    })
    .await;
    let mut session = WalletSession::new();
    session
        .connect(Some(JsonRpcProvider::new(&url).unwrap()))
        .await
        .unwrap();

    let binding = bind(&session, TOKEN, &BindOptions::default()).await.unwrap();
    assert_eq!(binding.name, "Token");
    assert_eq!(binding.display_balance(), "1");

    let mut form = TransferForm::default();
    form.set_contract_address(TOKEN);
    assert!(form.blur_contract_address(&session).await);
    form.set_recipient(RECIPIENT);
    form.set_amount("0.25");
    let tx_hash = form.submit(&session).await.unwrap();
    assert_eq!(tx_hash.0, format!("0x{}", "ab".repeat(32)));
}

#[test_log::test(tokio::test)]
async fn empty_return_data_is_a_call_failure() {
    let url = spawn_node(MockNode {
        wallet_methods: true,
        ..Default::default()
    })
    .await;
    let mut session = WalletSession::new();
    session
        .connect(Some(JsonRpcProvider::new(&url).unwrap()))
        .await
        .unwrap();

    let err = bind(
        &session,
        "0x0000000000000000000000000000000000000bad",
        &BindOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WalletError::CallFailure { ref method, .. } if method == "name"));
}

#[test_log::test(tokio::test)]
async fn rejected_transfer_leaves_form_idle() {
    let url = spawn_node(MockNode {
        wallet_methods: true,
        reject_transactions: true,
        ..Default::default()
    })
    .await;
    let mut session = WalletSession::new();
    session
        .connect(Some(JsonRpcProvider::new(&url).unwrap()))
        .await
        .unwrap();

    let mut form = TransferForm::default();
    form.set_contract_address(TOKEN);
    assert!(form.blur_contract_address(&session).await);
    form.set_recipient(RECIPIENT);
    form.set_amount("1");
    let err = form.submit(&session).await.unwrap_err();
    assert!(matches!(err, WalletError::UserRejected(_)));
    assert!(!form.is_busy());
    assert_eq!(form.action_error(), Some(&err));
}

#[test_log::test(tokio::test)]
async fn unreachable_endpoint_is_provider_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = JsonRpcProvider::new(&format!("http://{addr}/")).unwrap();
    let err = provider.request_accounts().await.unwrap_err();
    assert!(matches!(err, WalletError::ProviderUnavailable(_)));
}
