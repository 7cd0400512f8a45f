//! Custom error types for the farm monitor
//!
//! Provides structured error handling with context for the failure
//! scenarios the monitors distinguish between.

use std::fmt;

/// Main error type for the farm monitor
#[derive(Debug)]
pub enum MonitorError {
    /// Offline flag file errors
    FlagFile { path: String, reason: String },
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { path: String, reason: String },

    /// Client certificate or key could not be loaded
    CertificateLoad { path: String, reason: String },
}

/// RPC error variants
///
/// Every variant counts as a failed poll; the monitors decide how far to
/// escalate.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcError {
    /// TLS handshake, connection refused, timeout, non-2xx status
    Transport { endpoint: String, reason: String },

    /// The node answered with `success: false`
    Rpc { endpoint: String, message: String },

    /// The response body was not the expected JSON
    Decode { endpoint: String, reason: String },
}

impl RpcError {
    pub fn endpoint(&self) -> &str {
        match self {
            RpcError::Transport { endpoint, .. }
            | RpcError::Rpc { endpoint, .. }
            | RpcError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// Short detail suitable for a notice body
    pub fn detail(&self) -> String {
        match self {
            RpcError::Transport { reason, .. } => reason.clone(),
            RpcError::Rpc { message, .. } => message.clone(),
            RpcError::Decode { reason, .. } => format!("malformed response: {}", reason),
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::FlagFile { path, reason } => {
                write!(f, "Offline flag file '{}': {}", path, reason)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { path, reason } => {
                write!(f, "Failed to parse config '{}': {}", path, reason)
            }
            ConfigError::CertificateLoad { path, reason } => {
                write!(f, "Failed to load client certificate '{}': {}", path, reason)
            }
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport { endpoint, reason } => {
                write!(f, "{} request failed: {}", endpoint, reason)
            }
            RpcError::Rpc { endpoint, message } => {
                write!(f, "{} returned failure: {}", endpoint, message)
            }
            RpcError::Decode { endpoint, reason } => {
                write!(f, "{} response could not be decoded: {}", endpoint, reason)
            }
        }
    }
}

impl std::error::Error for MonitorError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for RpcError {}
