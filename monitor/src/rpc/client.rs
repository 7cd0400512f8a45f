//! Mutual-TLS JSON client for the node, farmer and wallet RPC services

use async_trait::async_trait;
use reqwest::{Client, Identity};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::types::{
    BlockRecord, BlockRecordPayload, BlockchainStatePayload, HarvesterConnection,
    HarvestersPayload, HeaderHashRequest, RpcResponse, WalletBalance, WalletBalancePayload,
    WalletIdRequest,
};
use super::{ChainRpc, FarmerRpc, WalletRpc};
use crate::constants::rpc;
use crate::errors::{ConfigError, RpcError};
use crate::health::types::SyncSnapshot;

#[derive(Clone)]
pub struct RpcClient {
    base_url: String,
    client: Client,
}

impl RpcClient {
    /// Build a client that authenticates with the service's private
    /// certificate pair. The node's own CA is self-signed, so server
    /// certificate verification is disabled.
    pub fn new(
        base_url: &str,
        cert_path: &str,
        key_path: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let cert = std::fs::read(cert_path).map_err(|e| ConfigError::CertificateLoad {
            path: cert_path.to_string(),
            reason: e.to_string(),
        })?;
        let key = std::fs::read(key_path).map_err(|e| ConfigError::CertificateLoad {
            path: key_path.to_string(),
            reason: e.to_string(),
        })?;
        let identity =
            Identity::from_pkcs8_pem(&cert, &key).map_err(|e| ConfigError::CertificateLoad {
                path: cert_path.to_string(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .identity(identity)
            .danger_accept_invalid_certs(true)
            .connect_timeout(rpc::CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: base_url.to_string(),
                reason: format!("failed to build RPC client: {}", e),
            })?;

        Ok(Self::with_http_client(base_url, client))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, RpcError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        debug!("{} response: {}", endpoint, String::from_utf8_lossy(&bytes));

        let envelope: RpcResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: format!("HTTP {}", status),
                });
            }
            Err(e) => {
                return Err(RpcError::Decode {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if !envelope.success {
            return Err(RpcError::Rpc {
                endpoint: endpoint.to_string(),
                message: envelope
                    .error
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        Ok(envelope.payload)
    }
}

fn transport_error(endpoint: &str, e: reqwest::Error) -> RpcError {
    let reason = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    RpcError::Transport {
        endpoint: endpoint.to_string(),
        reason,
    }
}

fn missing_field(endpoint: &str, field: &str) -> RpcError {
    RpcError::Decode {
        endpoint: endpoint.to_string(),
        reason: format!("missing field `{}`", field),
    }
}

#[async_trait]
impl ChainRpc for RpcClient {
    async fn blockchain_state(&self) -> Result<SyncSnapshot, RpcError> {
        let payload: BlockchainStatePayload = self
            .post(rpc::GET_BLOCKCHAIN_STATE, &serde_json::json!({}))
            .await?;
        payload
            .blockchain_state
            .map(SyncSnapshot::from)
            .ok_or_else(|| missing_field(rpc::GET_BLOCKCHAIN_STATE, "blockchain_state"))
    }

    async fn block_record(&self, header_hash: &str) -> Result<BlockRecord, RpcError> {
        let payload: BlockRecordPayload = self
            .post(rpc::GET_BLOCK_RECORD, &HeaderHashRequest { header_hash })
            .await?;
        payload
            .block_record
            .ok_or_else(|| missing_field(rpc::GET_BLOCK_RECORD, "block_record"))
    }
}

#[async_trait]
impl FarmerRpc for RpcClient {
    async fn harvester_connections(&self) -> Result<Vec<HarvesterConnection>, RpcError> {
        let payload: HarvestersPayload = self
            .post(rpc::GET_HARVESTERS, &serde_json::json!({}))
            .await?;
        Ok(payload
            .harvesters
            .into_iter()
            .map(|entry| entry.connection)
            .collect())
    }
}

#[async_trait]
impl WalletRpc for RpcClient {
    async fn wallet_balance(&self, wallet_id: u32) -> Result<WalletBalance, RpcError> {
        let payload: WalletBalancePayload = self
            .post(rpc::GET_WALLET_BALANCE, &WalletIdRequest { wallet_id })
            .await?;
        payload
            .wallet_balance
            .ok_or_else(|| missing_field(rpc::GET_WALLET_BALANCE, "wallet_balance"))
    }
}
