//! Report Engine
//!
//! Composes record-store reads with aggregation, classification and ranking
//! into the report views.
//!
//! # Consistency
//!
//! Each report issues several independent store reads (listed on each
//! method). They are not taken from one snapshot, so a write landing between
//! two reads can make the parts of one report disagree slightly. Reports are
//! request-scoped and hold no state between calls.

use crate::report::aggregate::{count_by, count_in_encounter_order, daily_trend, KindBreakdown};
use crate::report::error::{ReportError, ReportResult};
use crate::report::ranking::{top_n, TOP_CLIENTS};
use crate::report::status::{classify, SinceLastSharpen, RECENT_MAX_DAYS, REGULAR_MAX_DAYS};
use crate::report::views::*;
use crate::report::window::{end_of_day, start_of_day, start_of_month, start_of_week, ReportWindow};
use crate::store::{
    BladeFilter, BladeOrder, RecordDetail, RecordFilter, RecordStore, SharpenKind,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Builds report views from a record store
pub struct ReportEngine {
    store: Arc<dyn RecordStore>,
}

impl ReportEngine {
    /// Create a new report engine
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Dashboard summary as of `now`
    ///
    /// Reads: today's records, this week's records, this month's records,
    /// stale active blades.
    pub async fn dashboard_summary(&self, now: DateTime<Utc>) -> ReportResult<DashboardSummary> {
        let start = Instant::now();
        let day_end = end_of_day(now);

        let today = self
            .store
            .records(&RecordFilter::new().between(start_of_day(now), day_end))
            .await?;
        let week = self
            .store
            .records(&RecordFilter::new().between(start_of_week(now), day_end))
            .await?;
        let month = self
            .store
            .records(&RecordFilter::new().between(start_of_month(now), day_end))
            .await?;

        let cutoff = now - Duration::days(REGULAR_MAX_DAYS);
        let stale = self
            .store
            .blades(
                &BladeFilter::new()
                    .active_only()
                    .stale_before(cutoff)
                    .order(BladeOrder::LastSharpenedAsc),
            )
            .await?;

        let entries: Vec<TodayEntry> = today
            .iter()
            .map(|d| TodayEntry {
                id: d.record.id,
                time: d.record.performed_at.format("%H:%M:%S").to_string(),
                performed_at: d.record.performed_at,
                kind: d.record.kind,
                blade_code: d.blade_code.clone(),
                client_name: d.client_name.clone(),
                operator_name: d.operator_name.clone(),
            })
            .collect();

        let blades_needing_attention = stale
            .iter()
            .map(|d| AttentionBlade {
                id: d.blade.id,
                code: d.blade.code.clone(),
                blade_type: d.blade_type.name.clone(),
                client_name: d.client.name.clone(),
                last_sharpened_at: d.blade.last_sharpened_at,
                days_since_sharpened: SinceLastSharpen::from_last(d.blade.last_sharpened_at, now),
            })
            .collect();

        tracing::debug!(
            today = entries.len(),
            week = week.len(),
            month = month.len(),
            stale = stale.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built dashboard summary"
        );

        Ok(DashboardSummary {
            generated_at: now,
            today: TodaySummary {
                total: entries.len(),
                entries,
            },
            this_week: KindBreakdown::from_records(week.iter().map(|d| &d.record)),
            this_month: KindBreakdown::from_records(month.iter().map(|d| &d.record)),
            blades_needing_attention,
        })
    }

    /// A blade with its full history, newest first
    ///
    /// Reads: the blade, its records.
    pub async fn blade_report(&self, blade_id: i64) -> ReportResult<BladeReport> {
        let detail = self
            .store
            .blade(blade_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("Blade {}", blade_id)))?;

        let records = self
            .store
            .records(&RecordFilter::new().blade(blade_id))
            .await?;

        Ok(BladeReport {
            blade: BladeSummary::from(&detail),
            history: records.iter().map(HistoryEntry::from).collect(),
            summary: KindBreakdown::from_records(records.iter().map(|d| &d.record)),
        })
    }

    /// A client with all of its active blades and their histories
    ///
    /// Reads: the client, its active blades, its records.
    pub async fn client_report(&self, client_id: i64) -> ReportResult<ClientReport> {
        let client = self
            .store
            .client(client_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("Client {}", client_id)))?;

        let blades = self
            .store
            .blades(&BladeFilter::new().client(client_id).active_only())
            .await?;
        let records = self
            .store
            .records(&RecordFilter::new().client(client_id))
            .await?;

        let by_blade = group_by_blade(&records);
        let mut summary = KindBreakdown::default();

        let blades: Vec<ClientBlade> = blades
            .iter()
            .map(|d| {
                let history = by_blade.get(&d.blade.id).cloned().unwrap_or_default();
                summary.merge(&KindBreakdown::from_records(history.iter().map(|h| &h.record)));

                ClientBlade {
                    id: d.blade.id,
                    code: d.blade.code.clone(),
                    blade_type: BladeTypeRef::from(&d.blade_type),
                    last_sharpened_at: d.blade.last_sharpened_at,
                    history: history.iter().map(|h| HistoryEntry::from(*h)).collect(),
                }
            })
            .collect();

        Ok(ClientReport {
            client,
            summary: ClientSummary {
                total_blades: blades.len(),
                total_sharpenings: summary.total,
                by_kind: summary.by_kind,
            },
            blades,
        })
    }

    /// A client's blades (active or not) with recency status
    ///
    /// `since`/`until` bound `last_sharpened_at`; a bounded query leaves out
    /// never-sharpened blades.
    ///
    /// Reads: the client, its blades, its records.
    pub async fn client_blades(
        &self,
        client_id: i64,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ReportResult<ClientBladesView> {
        if let (Some(s), Some(u)) = (since, until) {
            ReportWindow::new(s, u)?;
        }

        let client = self
            .store
            .client(client_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("Client {}", client_id)))?;

        let blades = self
            .store
            .blades(
                &BladeFilter::new()
                    .client(client_id)
                    .sharpened_since(since)
                    .sharpened_until(until),
            )
            .await?;
        let records = self
            .store
            .records(&RecordFilter::new().client(client_id))
            .await?;

        let by_blade = group_by_blade(&records);
        let recent_cutoff = now - Duration::days(RECENT_MAX_DAYS);

        let blades: Vec<BladeStatus> = blades
            .iter()
            .map(|d| {
                let history = by_blade.get(&d.blade.id).map(Vec::as_slice).unwrap_or(&[]);
                let recent = history
                    .iter()
                    .filter(|h| h.record.performed_at >= recent_cutoff)
                    .count();

                BladeStatus {
                    id: d.blade.id,
                    code: d.blade.code.clone(),
                    blade_type: BladeTypeRef::from(&d.blade_type),
                    active: d.blade.active,
                    last_sharpened_at: d.blade.last_sharpened_at,
                    total_sharpenings: history.len(),
                    sharpened_last_30_days: recent,
                    freshness: classify(d.blade.last_sharpened_at, now),
                }
            })
            .collect();

        let summary = BladeStatusSummary {
            total_blades: blades.len(),
            active_blades: blades.iter().filter(|b| b.active).count(),
            by_freshness: count_by(&blades, |b| b.freshness),
        };

        Ok(ClientBladesView {
            client,
            blades,
            summary,
        })
    }

    /// Aggregate statistics over a closed window
    ///
    /// Reads: records in the window, names of the clients they belong to.
    pub async fn statistics(&self, window: ReportWindow) -> ReportResult<Statistics> {
        let start = Instant::now();

        let records = self
            .store
            .records(&RecordFilter::new().between(window.since, window.until))
            .await?;

        let client_counts = count_in_encounter_order(&records, |d| d.client_id);
        let client_ids: Vec<i64> = client_counts.iter().map(|(id, _)| *id).collect();

        let names: HashMap<i64, String> = self
            .store
            .clients_by_ids(&client_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let top_clients = top_n(&client_counts, TOP_CLIENTS, |id| names.get(id).cloned())?;

        let blades_sharpened = records
            .iter()
            .map(|d| d.record.blade_id)
            .collect::<HashSet<_>>()
            .len();

        let stats = Statistics {
            window,
            totals: StatisticsTotals {
                sharpenings: records.len(),
                clients_served: client_counts.len(),
                blades_sharpened,
            },
            by_kind: count_by(&records, |d| d.record.kind),
            by_operator: count_by(&records, |d| d.operator_name.clone()),
            top_clients,
            daily_average: daily_average(records.len(), window.days()),
            trend: daily_trend(records.iter().map(|d| d.record.performed_at)),
        };

        tracing::debug!(
            since = %window.since,
            until = %window.until,
            sharpenings = stats.totals.sharpenings,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built statistics"
        );

        Ok(stats)
    }

    /// Active blades whose code contains `code`, ordered by code
    pub async fn search_blades(&self, code: Option<&str>) -> ReportResult<Vec<BladeSummary>> {
        let code = required(code, "A code is required to search blades")?;

        let blades = self
            .store
            .blades(&BladeFilter::new().active_only().code_contains(code))
            .await?;

        Ok(blades.iter().map(BladeSummary::from).collect())
    }

    /// Clients whose name contains `name`, ordered by name
    pub async fn search_clients(
        &self,
        name: Option<&str>,
    ) -> ReportResult<Vec<crate::store::Client>> {
        let name = required(name, "A name is required to search clients")?;
        Ok(self.store.clients_named(name).await?)
    }

    /// Sharpening history filtered by optional bounds and kind, newest first
    pub async fn search_history(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        kind: Option<SharpenKind>,
    ) -> ReportResult<Vec<HistorySearchHit>> {
        if let (Some(f), Some(t)) = (from, to) {
            ReportWindow::new(f, t)?;
        }

        let filter = RecordFilter::new()
            .performed_since(from)
            .performed_until(to)
            .of_kind(kind);

        let records = self.store.records(&filter).await?;
        Ok(records.iter().map(HistorySearchHit::from).collect())
    }
}

/// Average records per day over a window of `days`, rounded
///
/// A zero-length (or negative) window yields 0.
pub fn daily_average(total: usize, days: f64) -> u64 {
    if days <= 0.0 {
        return 0;
    }
    (total as f64 / days).round() as u64
}

fn group_by_blade(records: &[RecordDetail]) -> HashMap<i64, Vec<&RecordDetail>> {
    let mut groups: HashMap<i64, Vec<&RecordDetail>> = HashMap::new();
    for record in records {
        groups.entry(record.record.blade_id).or_default().push(record);
    }
    groups
}

fn required<'a>(value: Option<&'a str>, message: &str) -> ReportResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ReportError::InvalidArgument(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::status::Freshness;
    use crate::store::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()
    }

    struct Shop {
        store: Arc<SqliteStore>,
        engine: ReportEngine,
        acme: Client,
        ripsaw: BladeType,
        ana: Operator,
    }

    fn shop() -> Shop {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let acme = store.insert_client(&Client::new("Acme")).unwrap();
        let ripsaw = store
            .insert_blade_type(&BladeType::new("RIP", "Ripsaw"))
            .unwrap();
        let ana = store
            .insert_operator(&Operator::new("Ana", Role::Operator))
            .unwrap();
        let engine = ReportEngine::new(store.clone());

        Shop {
            store,
            engine,
            acme,
            ripsaw,
            ana,
        }
    }

    impl Shop {
        fn blade(&self, code: &str, client: &Client) -> Blade {
            self.store
                .insert_blade(&Blade::new(code, client.id, self.ripsaw.id))
                .unwrap()
        }

        fn sharpen(&self, blade: &Blade, kind: SharpenKind, at: DateTime<Utc>) {
            self.store
                .record_sharpening(&NewSharpening::new(blade.id, kind, self.ana.id).at(at))
                .unwrap();
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl RecordStore for UnreachableStore {
        async fn client(&self, _id: i64) -> StoreResult<Option<Client>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn clients_by_ids(&self, _ids: &[i64]) -> StoreResult<Vec<Client>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn clients_named(&self, _fragment: &str) -> StoreResult<Vec<Client>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn blade(&self, _id: i64) -> StoreResult<Option<BladeDetail>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn blades(&self, _filter: &BladeFilter) -> StoreResult<Vec<BladeDetail>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn records(&self, _filter: &RecordFilter) -> StoreResult<Vec<RecordDetail>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn operator(&self, _id: i64) -> StoreResult<Option<Operator>> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Lock("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_blade_report_and_client_blades_scenario() {
        let shop = shop();
        let b1 = shop.blade("B1", &shop.acme);
        let n = now();

        shop.sharpen(&b1, SharpenKind::Full, n - Duration::days(40));
        shop.sharpen(&b1, SharpenKind::Edge, n - Duration::days(2));
        shop.sharpen(&b1, SharpenKind::Edge, n - Duration::days(1));

        let report = shop.engine.blade_report(b1.id).await.unwrap();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.by_kind[&SharpenKind::Edge], 2);
        assert_eq!(report.summary.by_kind[&SharpenKind::Full], 1);
        assert!(!report.summary.by_kind.contains_key(&SharpenKind::Face));
        assert_eq!(report.blade.client.name, "Acme");
        assert_eq!(report.blade.blade_type.name, "Ripsaw");
        // Newest first
        assert_eq!(report.history[0].performed_at, n - Duration::days(1));
        assert_eq!(report.history[2].performed_at, n - Duration::days(40));
        assert_eq!(report.history[0].operator, "Ana");

        let view = shop
            .engine
            .client_blades(shop.acme.id, None, None, n)
            .await
            .unwrap();
        assert_eq!(view.blades.len(), 1);
        assert_eq!(view.blades[0].total_sharpenings, 3);
        assert_eq!(view.blades[0].sharpened_last_30_days, 2);
        assert_eq!(view.blades[0].freshness, Freshness::Recent);
        assert_eq!(view.summary.by_freshness[&Freshness::Recent], 1);
    }

    #[tokio::test]
    async fn test_blade_report_not_found() {
        let shop = shop();
        let err = shop.engine.blade_report(404).await.unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_client_report_only_active_blades() {
        let shop = shop();
        let n = now();
        let b1 = shop.blade("B1", &shop.acme);
        let b2 = shop.blade("B2", &shop.acme);
        shop.sharpen(&b1, SharpenKind::Edge, n - Duration::days(3));
        shop.sharpen(&b1, SharpenKind::Face, n - Duration::days(1));
        shop.sharpen(&b2, SharpenKind::Full, n - Duration::days(5));

        let retired = shop
            .store
            .insert_blade(&Blade::new("B3", shop.acme.id, shop.ripsaw.id).active(false))
            .unwrap();
        assert!(!retired.active);

        let other = shop.store.insert_client(&Client::new("Beta")).unwrap();
        let b4 = shop.blade("B4", &other);
        shop.sharpen(&b4, SharpenKind::Edge, n);

        let report = shop.engine.client_report(shop.acme.id).await.unwrap();
        assert_eq!(report.summary.total_blades, 2);
        assert_eq!(report.summary.total_sharpenings, 3);
        assert_eq!(report.summary.by_kind[&SharpenKind::Edge], 1);
        assert_eq!(report.summary.by_kind[&SharpenKind::Face], 1);
        assert_eq!(report.summary.by_kind[&SharpenKind::Full], 1);

        let first = report.blades.iter().find(|b| b.code == "B1").unwrap();
        assert_eq!(first.history.len(), 2);
        assert!(first.history[0].performed_at > first.history[1].performed_at);

        let err = shop.engine.client_report(999).await.unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_client_blades_filters_and_summary() {
        let shop = shop();
        let n = now();
        let fresh = shop.blade("B-FRESH", &shop.acme);
        let old = shop.blade("B-OLD", &shop.acme);
        shop.blade("B-NEVER", &shop.acme);
        shop.store
            .insert_blade(&Blade::new("B-RETIRED", shop.acme.id, shop.ripsaw.id).active(false))
            .unwrap();

        shop.sharpen(&fresh, SharpenKind::Edge, n - Duration::days(10));
        shop.sharpen(&old, SharpenKind::Edge, n - Duration::days(90));

        let view = shop
            .engine
            .client_blades(shop.acme.id, None, None, n)
            .await
            .unwrap();
        assert_eq!(view.summary.total_blades, 4);
        assert_eq!(view.summary.active_blades, 3);
        assert_eq!(view.summary.by_freshness[&Freshness::NeverSharpened], 2);
        assert_eq!(view.summary.by_freshness[&Freshness::NeedsAttention], 1);
        assert_eq!(view.summary.by_freshness[&Freshness::Recent], 1);

        let bounded = shop
            .engine
            .client_blades(shop.acme.id, Some(n - Duration::days(30)), Some(n), n)
            .await
            .unwrap();
        assert_eq!(bounded.blades.len(), 1);
        assert_eq!(bounded.blades[0].code, "B-FRESH");

        let err = shop
            .engine
            .client_blades(shop.acme.id, Some(n), Some(n - Duration::days(1)), n)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let shop = shop();
        let n = now();
        let b1 = shop.blade("B1", &shop.acme);
        let b2 = shop.blade("B2", &shop.acme);
        let b3 = shop.blade("B3", &shop.acme);
        let never = shop.blade("B0", &shop.acme);

        // Today
        shop.sharpen(&b1, SharpenKind::Edge, start_of_day(n) + Duration::hours(9));
        // Earlier this week (Monday)
        shop.sharpen(&b2, SharpenKind::Face, n - Duration::days(2));
        // Earlier this month, previous week
        shop.sharpen(&b2, SharpenKind::Full, n - Duration::days(9));
        // Stale blade, last sharpened 75 days ago
        shop.sharpen(&b3, SharpenKind::Full, n - Duration::days(75));

        let dash = shop.engine.dashboard_summary(n).await.unwrap();

        assert_eq!(dash.today.total, 1);
        assert_eq!(dash.today.entries[0].time, "09:00:00");
        assert_eq!(dash.today.entries[0].blade_code, "B1");
        assert_eq!(dash.today.entries[0].client_name, "Acme");
        assert_eq!(dash.today.entries[0].operator_name, "Ana");

        assert_eq!(dash.this_week.total, 2);
        assert_eq!(dash.this_month.total, 3);
        assert_eq!(dash.this_month.by_kind[&SharpenKind::Full], 1);

        let stale: Vec<&str> = dash
            .blades_needing_attention
            .iter()
            .map(|b| b.code.as_str())
            .collect();
        assert_eq!(stale, vec![never.code.as_str(), "B3"]);
        assert_eq!(
            dash.blades_needing_attention[0].days_since_sharpened,
            SinceLastSharpen::Never
        );
        assert_eq!(
            dash.blades_needing_attention[1].days_since_sharpened,
            SinceLastSharpen::Days(75)
        );
    }

    #[tokio::test]
    async fn test_dashboard_today_is_closed_day() {
        let shop = shop();
        let n = now();
        let b = shop.blade("B1", &shop.acme);

        shop.sharpen(&b, SharpenKind::Edge, start_of_day(n) - Duration::milliseconds(1));
        shop.sharpen(&b, SharpenKind::Face, start_of_day(n));
        shop.sharpen(&b, SharpenKind::Full, end_of_day(n));
        shop.sharpen(&b, SharpenKind::Edge, end_of_day(n) + Duration::milliseconds(1));

        let dash = shop.engine.dashboard_summary(n).await.unwrap();

        assert_eq!(dash.today.total, 2);
        let times: Vec<&str> = dash.today.entries.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["23:59:59", "00:00:00"]);
        assert_eq!(dash.today.entries[0].kind, SharpenKind::Full);
        assert_eq!(dash.today.entries[1].kind, SharpenKind::Face);

        // Tuesday's record still counts for the week; tomorrow's never does
        assert_eq!(dash.this_week.total, 3);
        assert_eq!(dash.this_month.total, 3);
    }

    #[tokio::test]
    async fn test_statistics_top_clients_scenario() {
        let shop = shop();
        let n = now();
        let beta = shop.store.insert_client(&Client::new("Beta")).unwrap();
        let gamma = shop.store.insert_client(&Client::new("Gamma")).unwrap();

        let a = shop.blade("A1", &shop.acme);
        let b = shop.blade("B1", &beta);
        let g = shop.blade("G1", &gamma);

        for day in 1..=6 {
            shop.sharpen(&a, SharpenKind::Edge, n - Duration::days(day));
        }
        for day in 1..=3 {
            shop.sharpen(&b, SharpenKind::Face, n - Duration::days(day));
        }
        shop.sharpen(&g, SharpenKind::Full, n - Duration::days(4));
        // Outside the window
        shop.sharpen(&g, SharpenKind::Full, n - Duration::days(45));

        let window = ReportWindow::new(n - Duration::days(30), n).unwrap();
        let stats = shop.engine.statistics(window).await.unwrap();

        assert_eq!(stats.totals.sharpenings, 10);
        assert_eq!(stats.totals.clients_served, 3);
        assert_eq!(stats.totals.blades_sharpened, 3);
        assert_eq!(stats.top_clients[0].name, "Acme");
        assert_eq!(stats.top_clients[0].count, 6);
        assert_eq!(stats.top_clients.len(), 3);
        assert_eq!(stats.by_kind[&SharpenKind::Edge], 6);
        assert_eq!(stats.by_operator["Ana"], 10);
        // 10 records over 30 days
        assert_eq!(stats.daily_average, 0);
        assert_eq!(stats.trend.len(), 6);
        assert!(stats.trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn test_statistics_zero_length_window() {
        let shop = shop();
        let n = now();
        let a = shop.blade("A1", &shop.acme);
        shop.sharpen(&a, SharpenKind::Edge, n);

        let stats = shop
            .engine
            .statistics(ReportWindow::new(n, n).unwrap())
            .await
            .unwrap();
        assert_eq!(stats.totals.sharpenings, 1);
        assert_eq!(stats.daily_average, 0);
    }

    #[tokio::test]
    async fn test_statistics_empty_window() {
        let shop = shop();
        let stats = shop
            .engine
            .statistics(ReportWindow::last_month(now()))
            .await
            .unwrap();
        assert_eq!(stats.totals.sharpenings, 0);
        assert!(stats.by_kind.is_empty());
        assert!(stats.top_clients.is_empty());
        assert!(stats.trend.is_empty());
        assert_eq!(stats.daily_average, 0);
    }

    #[test]
    fn test_daily_average() {
        assert_eq!(daily_average(10, 4.0), 3);
        assert_eq!(daily_average(10, 0.0), 0);
        assert_eq!(daily_average(0, 30.0), 0);
        assert_eq!(daily_average(45, 30.0), 2);
        assert_eq!(daily_average(7, 0.5), 14);
    }

    #[tokio::test]
    async fn test_searches() {
        let shop = shop();
        let n = now();
        let b = shop.blade("RIP-0042", &shop.acme);
        shop.blade("BAND-7", &shop.acme);
        shop.sharpen(&b, SharpenKind::Face, n - Duration::days(1));
        shop.sharpen(&b, SharpenKind::Edge, n - Duration::days(20));

        let hits = shop.engine.search_blades(Some("rip")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "RIP-0042");

        let err = shop.engine.search_blades(None).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
        let err = shop.engine.search_clients(Some("  ")).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));

        let clients = shop.engine.search_clients(Some("ac")).await.unwrap();
        assert_eq!(clients.len(), 1);

        let faces = shop
            .engine
            .search_history(None, None, Some(SharpenKind::Face))
            .await
            .unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].client.name, "Acme");

        let recent = shop
            .engine
            .search_history(Some(n - Duration::days(7)), Some(n), None)
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_report() {
        let engine = ReportEngine::new(Arc::new(UnreachableStore));

        let err = engine.dashboard_summary(now()).await.unwrap_err();
        assert!(matches!(err, ReportError::DependencyUnavailable(_)));

        let err = engine.blade_report(1).await.unwrap_err();
        assert!(matches!(err, ReportError::DependencyUnavailable(_)));

        let err = engine
            .statistics(ReportWindow::last_month(now()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::DependencyUnavailable(_)));
    }
}
