pub mod notify_service;
pub mod pool_service;
pub mod recovery_service;

pub use notify_service::{Delivery, Notice, NoticeEvent, Notifier, NotifyService};
pub use pool_service::{PoolEarnings, PoolService};
pub use recovery_service::{RecoveryActuator, RecoveryOutcome, RecoveryService};
