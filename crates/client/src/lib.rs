//! Client library for the club hours server
//!
//! REST access, seat timers, an offline write queue and the realtime
//! snapshot feed.

pub mod active_table;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod offline_queue;
pub mod realtime;

pub use active_table::{ActiveTable, TableError};
pub use api::ApiClient;
pub use config::ClientConfig;
pub use dashboard::{Dashboard, SubmitOutcome};
pub use error::ClientError;
pub use offline_queue::{OfflineQueue, OperationExecutor, PendingOperation, QueuedOperation, ReplayReport};
pub use realtime::run_subscription;
