//! Reporting
//!
//! Read-only reports over the sharpening record store:
//!
//! - `engine`: assembles dashboard, per-blade, per-client and statistics views
//! - `status`: blade freshness classification
//! - `aggregate`: grouping and counting of records
//! - `ranking`: top-N by volume
//! - `window`: report windows and UTC calendar boundaries

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod status;
pub mod views;
pub mod window;

pub use aggregate::{count_by, count_in_encounter_order, daily_trend, DailyCount, KindBreakdown};
pub use engine::{daily_average, ReportEngine};
pub use error::{ReportError, ReportResult};
pub use ranking::{top_n, RankedEntry, TOP_CLIENTS};
pub use status::{classify, Freshness, SinceLastSharpen};
pub use views::*;
pub use window::{parse_bound, Bound, ReportWindow};
