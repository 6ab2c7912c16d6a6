//! # Sawdesk
//!
//! Reporting and statistics for a saw-sharpening shop: what was sharpened
//! today, which blades are overdue, per-blade and per-client histories, and
//! manager statistics over a time window.
//!
//! ## Modules
//!
//! - [`store`]: Clients, blades, operators and sharpening records (SQLite)
//! - [`report`]: Freshness classification, aggregation, ranking and report assembly
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sawdesk::report::{ReportEngine, ReportWindow};
//! use sawdesk::store::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("sawdesk.db")?);
//!
//!     let client = store.insert_client(&Client::new("Acme Lumber"))?;
//!     let rip = store.insert_blade_type(&BladeType::new("RIP", "Ripsaw"))?;
//!     let blade = store.insert_blade(&Blade::new("RIP-001", client.id, rip.id))?;
//!     let ana = store.insert_operator(&Operator::new("Ana", Role::Operator))?;
//!
//!     store.record_sharpening(&NewSharpening::new(blade.id, SharpenKind::Edge, ana.id))?;
//!
//!     let engine = ReportEngine::new(store);
//!     let report = engine.blade_report(blade.id).await?;
//!     println!("{} sharpenings", report.summary.total);
//!
//!     let stats = engine.statistics(ReportWindow::last_month(chrono::Utc::now())).await?;
//!     println!("{} per day", stats.daily_average);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod report;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Blade, BladeDetail, BladeFilter, BladeType, Client, NewSharpening, Operator, RecordDetail,
    RecordFilter, RecordStore, Role, SharpenKind, SharpeningRecord, SqliteStore, StoreError,
    StoreResult,
};

pub use report::{
    classify, Freshness, ReportEngine, ReportError, ReportResult, ReportWindow,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, Environment, LoggingConfig, StoreConfig};
