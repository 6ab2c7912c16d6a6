//! Report view models
//!
//! Read-only projections returned by the report engine and serialized
//! straight to JSON by the API layer.

use crate::report::aggregate::{DailyCount, KindBreakdown};
use crate::report::ranking::RankedEntry;
use crate::report::status::{Freshness, SinceLastSharpen};
use crate::report::window::ReportWindow;
use crate::store::{BladeDetail, BladeType, Client, RecordDetail, SharpenKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================
// SHARED FRAGMENTS
// ============================================

/// Blade type as shown inside reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BladeTypeRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl From<&BladeType> for BladeTypeRef {
    fn from(t: &BladeType) -> Self {
        Self {
            id: t.id,
            code: t.code.clone(),
            name: t.name.clone(),
        }
    }
}

/// Client as shown inside blade listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRef {
    pub id: i64,
    pub name: String,
}

impl From<&Client> for ClientRef {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
        }
    }
}

/// A blade with its type and owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BladeSummary {
    pub id: i64,
    pub code: String,
    pub blade_type: BladeTypeRef,
    pub client: ClientRef,
    pub last_sharpened_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl From<&BladeDetail> for BladeSummary {
    fn from(d: &BladeDetail) -> Self {
        Self {
            id: d.blade.id,
            code: d.blade.code.clone(),
            blade_type: BladeTypeRef::from(&d.blade_type),
            client: ClientRef::from(&d.client),
            last_sharpened_at: d.blade.last_sharpened_at,
            active: d.blade.active,
        }
    }
}

/// One line of a blade's sharpening history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub performed_at: DateTime<Utc>,
    pub kind: SharpenKind,
    pub notes: Option<String>,
    pub operator: String,
}

impl From<&RecordDetail> for HistoryEntry {
    fn from(d: &RecordDetail) -> Self {
        Self {
            id: d.record.id,
            performed_at: d.record.performed_at,
            kind: d.record.kind,
            notes: d.record.notes.clone(),
            operator: d.operator_name.clone(),
        }
    }
}

// ============================================
// DASHBOARD
// ============================================

/// Dashboard summary as of a reference instant
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub today: TodaySummary,
    pub this_week: KindBreakdown,
    pub this_month: KindBreakdown,
    pub blades_needing_attention: Vec<AttentionBlade>,
}

/// Sharpenings performed today
#[derive(Debug, Clone, Serialize)]
pub struct TodaySummary {
    pub total: usize,
    pub entries: Vec<TodayEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayEntry {
    pub id: i64,
    /// Time of day, `HH:MM:SS` UTC
    pub time: String,
    pub performed_at: DateTime<Utc>,
    pub kind: SharpenKind,
    pub blade_code: String,
    pub client_name: String,
    pub operator_name: String,
}

/// Active blade not sharpened for over 60 days (or never)
#[derive(Debug, Clone, Serialize)]
pub struct AttentionBlade {
    pub id: i64,
    pub code: String,
    pub blade_type: String,
    pub client_name: String,
    pub last_sharpened_at: Option<DateTime<Utc>>,
    pub days_since_sharpened: SinceLastSharpen,
}

// ============================================
// PER-BLADE / PER-CLIENT
// ============================================

/// A blade with its full history
#[derive(Debug, Clone, Serialize)]
pub struct BladeReport {
    pub blade: BladeSummary,
    pub history: Vec<HistoryEntry>,
    pub summary: KindBreakdown,
}

/// A client with all active blades and their histories
#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub client: Client,
    pub blades: Vec<ClientBlade>,
    pub summary: ClientSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientBlade {
    pub id: i64,
    pub code: String,
    pub blade_type: BladeTypeRef,
    pub last_sharpened_at: Option<DateTime<Utc>>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub total_blades: usize,
    pub total_sharpenings: usize,
    pub by_kind: BTreeMap<SharpenKind, usize>,
}

/// A client's blades with recency status
#[derive(Debug, Clone, Serialize)]
pub struct ClientBladesView {
    pub client: Client,
    pub blades: Vec<BladeStatus>,
    pub summary: BladeStatusSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BladeStatus {
    pub id: i64,
    pub code: String,
    pub blade_type: BladeTypeRef,
    pub active: bool,
    pub last_sharpened_at: Option<DateTime<Utc>>,
    pub total_sharpenings: usize,
    pub sharpened_last_30_days: usize,
    pub freshness: Freshness,
}

#[derive(Debug, Clone, Serialize)]
pub struct BladeStatusSummary {
    pub total_blades: usize,
    pub active_blades: usize,
    pub by_freshness: BTreeMap<Freshness, usize>,
}

// ============================================
// STATISTICS
// ============================================

/// Aggregate statistics over a report window
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub window: ReportWindow,
    pub totals: StatisticsTotals,
    pub by_kind: BTreeMap<SharpenKind, usize>,
    pub by_operator: BTreeMap<String, usize>,
    pub top_clients: Vec<RankedEntry>,
    /// round(sharpenings / window days); 0 for a zero-length window
    pub daily_average: u64,
    pub trend: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsTotals {
    pub sharpenings: usize,
    pub clients_served: usize,
    pub blades_sharpened: usize,
}

// ============================================
// SEARCH
// ============================================

/// A history search hit with its blade and client
#[derive(Debug, Clone, Serialize)]
pub struct HistorySearchHit {
    pub id: i64,
    pub performed_at: DateTime<Utc>,
    pub kind: SharpenKind,
    pub notes: Option<String>,
    pub blade_id: i64,
    pub blade_code: String,
    pub client: ClientRef,
    pub operator: String,
}

impl From<&RecordDetail> for HistorySearchHit {
    fn from(d: &RecordDetail) -> Self {
        Self {
            id: d.record.id,
            performed_at: d.record.performed_at,
            kind: d.record.kind,
            notes: d.record.notes.clone(),
            blade_id: d.record.blade_id,
            blade_code: d.blade_code.clone(),
            client: ClientRef {
                id: d.client_id,
                name: d.client_name.clone(),
            },
            operator: d.operator_name.clone(),
        }
    }
}
