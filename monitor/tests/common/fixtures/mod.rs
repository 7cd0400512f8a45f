//! This module provides reusable test utilities:
//! - Mock HTTP servers (node RPC, webhook)
//! - In-memory doubles for the monitor seams
//! - Test configuration builders
//! - Common test data

// Each test binary uses a different subset of the fixtures
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod doubles;
pub mod mock_rpc;
pub mod mock_webhook;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use doubles::*;
pub use mock_rpc::MockRpcServer;
pub use mock_webhook::MockWebhookServer;
pub use test_config::*;
pub use test_data::*;
