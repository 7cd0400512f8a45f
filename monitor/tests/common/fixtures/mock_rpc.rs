//! Mock RPC server for testing node interactions
//!
//! Serves the node's JSON endpoints over plain HTTP so the real
//! `RpcClient` can be exercised without certificates.

use reqwest::Client;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use monitor::rpc::RpcClient;

pub struct MockRpcServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockRpcServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Client pointed at this server
    pub fn client(&self) -> RpcClient {
        RpcClient::with_http_client(&format!("{}/", self.base_url), Client::new())
    }

    async fn respond(&self, endpoint: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_blockchain_state(&self, synced: bool, tip: u64, progress: u64) {
        self.respond(
            "get_blockchain_state",
            200,
            json!({
                "success": true,
                "blockchain_state": {
                    "difficulty": 1024,
                    "peak": {
                        "header_hash": "0xpeak",
                        "height": progress,
                        "timestamp": 1_700_000_000u64
                    },
                    "space": 123_456_789u64,
                    "sync": {
                        "sync_mode": !synced,
                        "synced": synced,
                        "sync_tip_height": tip,
                        "sync_progress_height": progress
                    }
                }
            }),
        )
        .await;
    }

    pub async fn mock_block_record(
        &self,
        hash: &str,
        prev_hash: &str,
        height: u64,
        timestamp: Option<u64>,
    ) {
        Mock::given(method("POST"))
            .and(path("/get_block_record"))
            .and(body_partial_json(json!({ "header_hash": hash })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "block_record": {
                    "header_hash": hash,
                    "prev_hash": prev_hash,
                    "height": height,
                    "timestamp": timestamp
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_harvesters(&self, hosts: &[&str]) {
        let harvesters: Vec<Value> = hosts
            .iter()
            .map(|host| {
                json!({
                    "connection": { "host": host, "port": 8448, "node_id": format!("id-{}", host) },
                    "plots": []
                })
            })
            .collect();
        self.respond(
            "get_harvesters",
            200,
            json!({ "success": true, "harvesters": harvesters }),
        )
        .await;
    }

    pub async fn mock_wallet_balance(&self, wallet_id: u32, confirmed: u64) {
        Mock::given(method("POST"))
            .and(path("/get_wallet_balance"))
            .and(body_partial_json(json!({ "wallet_id": wallet_id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "wallet_balance": {
                    "wallet_id": wallet_id,
                    "confirmed_wallet_balance": confirmed,
                    "spendable_balance": confirmed,
                    "unconfirmed_wallet_balance": confirmed,
                    "pending_change": 0
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Node answers with `success: false`
    pub async fn mock_unsuccessful(&self, endpoint: &str, error: &str) {
        self.respond(endpoint, 200, json!({ "success": false, "error": error }))
            .await;
    }

    /// Body that is JSON but not the expected shape
    pub async fn mock_malformed(&self, endpoint: &str) {
        self.respond(endpoint, 200, json!({ "success": true, "blockchain_state": 7 }))
            .await;
    }

    pub async fn mock_http_error(&self, endpoint: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_string("Bad Gateway"))
            .mount(&self.server)
            .await;
    }
}
