//! Wire-compatibility tests: exact endpoint paths, headers and error
//! mapping of the node client.

use httpmock::prelude::*;
use octra_wallet::core::config::NodeConfig;
use octra_wallet::network::client::{
    ClaimTransferRequest, EncryptedBalanceRequest, NodeClient, PrivateTransferRequest,
};
use octra_wallet::WalletError;
use serde_json::json;

fn client(server: &MockServer) -> NodeClient {
    NodeClient::new(&NodeConfig { endpoint: server.base_url(), timeout_secs: 5 }).unwrap()
}

#[tokio::test]
async fn test_balance_path() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET).path("/balance/octAAA");
        then.status(200).json_body(json!({"balance": "3.25", "nonce": 11}));
    });

    let response = client(&server).balance("octAAA").await.unwrap();
    assert_eq!(response.balance_micro(), 3_250_000);
    assert_eq!(response.nonce(), 11);
    mock.assert();
}

#[tokio::test]
async fn test_view_encrypted_balance_header() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/view_encrypted_balance/octAAA")
            .header("X-Private-Key", "c2VlZA==");
        then.status(200).json_body(json!({"encrypted_balance_raw": "42"}));
    });

    let response =
        client(&server).view_encrypted_balance("octAAA", "c2VlZA==").await.unwrap();
    assert_eq!(response.raw_micro(), 42);
    mock.assert();
}

#[tokio::test]
async fn test_staging_and_history_paths() {
    let server = MockServer::start_async().await;
    let staging = server.mock(|when, then| {
        when.method(GET).path("/staging");
        then.status(200).json_body(json!({"staged_transactions": []}));
    });
    let history = server.mock(|when, then| {
        when.method(GET).path("/address/octAAA").query_param("limit", "20");
        then.status(200).json_body(json!({"recent_transactions": []}));
    });
    let tx = server.mock(|when, then| {
        when.method(GET).path("/tx/cafe01");
        then.status(200).json_body(json!({
            "parsed_tx": {"from": "octA", "to": "octB", "amount_raw": "7"}
        }));
    });

    let c = client(&server);
    assert!(c.staging().await.unwrap().staged_transactions.is_empty());
    assert!(c.recent_transactions("octAAA", 20).await.unwrap().recent_transactions.is_empty());
    assert_eq!(c.transaction("cafe01").await.unwrap().parsed_tx.amount_micro(), 7);
    staging.assert();
    history.assert();
    tx.assert();
}

#[tokio::test]
async fn test_shielded_and_transfer_paths() {
    let server = MockServer::start_async().await;
    let encrypt = server.mock(|when, then| {
        when.method(POST).path("/encrypt_balance");
        then.status(200).json_body(json!({"ok": true}));
    });
    let decrypt = server.mock(|when, then| {
        when.method(POST).path("/decrypt_balance");
        then.status(200).json_body(json!({"ok": true}));
    });
    let pubkey = server.mock(|when, then| {
        when.method(GET).path("/public_key/octBBB");
        then.status(200).json_body(json!({"public_key": "cGs="}));
    });
    let transfer = server.mock(|when, then| {
        when.method(POST).path("/private_transfer");
        then.status(200).json_body(json!({"ok": true}));
    });
    let pending = server.mock(|when, then| {
        when.method(GET)
            .path("/pending_private_transfers")
            .query_param("address", "octAAA")
            .header("X-Private-Key", "c2VlZA==");
        then.status(200).json_body(json!({"pending_transfers": []}));
    });
    let claim = server.mock(|when, then| {
        when.method(POST).path("/claim_private_transfer");
        then.status(200).json_body(json!({"ok": true}));
    });

    let c = client(&server);
    let balance_request = EncryptedBalanceRequest {
        address: "octAAA".to_string(),
        amount: "1".to_string(),
        private_key: "c2VlZA==".to_string(),
        encrypted_data: "v2|AAAA".to_string(),
    };
    c.encrypt_balance(&balance_request).await.unwrap();
    c.decrypt_balance(&balance_request).await.unwrap();
    assert_eq!(c.public_key("octBBB").await.unwrap().public_key.as_deref(), Some("cGs="));
    c.private_transfer(&PrivateTransferRequest {
        from: "octAAA".to_string(),
        to: "octBBB".to_string(),
        amount: "1".to_string(),
        from_private_key: "c2VlZA==".to_string(),
        to_public_key: "cGs=".to_string(),
    })
    .await
    .unwrap();
    assert!(c
        .pending_private_transfers("octAAA", "c2VlZA==")
        .await
        .unwrap()
        .pending_transfers
        .is_empty());
    c.claim_private_transfer(&ClaimTransferRequest {
        recipient_address: "octAAA".to_string(),
        private_key: "c2VlZA==".to_string(),
        transfer_id: json!(3),
    })
    .await
    .unwrap();

    encrypt.assert();
    decrypt.assert();
    pubkey.assert();
    transfer.assert();
    pending.assert();
    claim.assert();
}

#[tokio::test]
async fn test_error_mapping_prefers_node_message() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/balance/octAAA");
        then.status(400).json_body(json!({"error": "invalid address"}));
    });

    match client(&server).balance("octAAA").await {
        Err(WalletError::NetworkError(msg)) => assert_eq!(msg, "invalid address"),
        other => panic!("Expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_mapping_falls_back_to_status() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/balance/octAAA");
        then.status(503).body("upstream down");
    });

    match client(&server).balance("octAAA").await {
        Err(WalletError::NetworkError(msg)) => assert_eq!(msg, "HTTP 503"),
        other => panic!("Expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_an_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/balance/octAAA");
        then.status(200).body("<html>not json</html>");
    });

    let result = client(&server).balance("octAAA").await;
    assert!(matches!(result, Err(WalletError::NetworkError(_))));
}
