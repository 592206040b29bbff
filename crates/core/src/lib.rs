//! Monitor core logic.
//!
//! This crate provides the position-monitoring engine:
//! - Runtime configuration loading
//! - Position snapshots with fixed-point scaling of on-chain values
//! - Liquidation-risk derivation from the health factor
//! - The fetch protocol with endpoint failover and backoff
//! - Report formatting and the periodic reporting cycle

pub mod config;
mod fetcher;
mod monitor;
mod position;
pub mod report;
mod risk;

pub use config::{MonitorConfig, TelegramConfig};
pub use fetcher::{PositionFetcher, FETCH_BACKOFF};
pub use monitor::{Monitor, ReportSink};
pub use position::PositionSnapshot;
pub use risk::RiskMetrics;
