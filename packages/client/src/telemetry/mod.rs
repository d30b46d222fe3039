//! Telemetry for HTTP filesystem operations
//!
//! Lock-free counters shared by every operation bound to the same
//! [`OperationContext`](crate::config::OperationContext).

pub mod operation_stats;

pub use operation_stats::{OperationStats, OperationStatsSnapshot};
