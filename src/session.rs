//! One live dashboard session.
//!
//! A session owns the whole pipeline for a subject: it aggregates the
//! report sources, projects the series onto calendar windows, and drives
//! the chart lifecycle. Environment signals (theme transitions, viewport
//! resizes) and a refresh interval feed a single event loop so chart
//! rebuilds never race each other.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aggregate::{
    DashboardData, Degraded, ReportAggregator, SELLER_WINDOW_DAYS, Subject, USER_WINDOW_DAYS,
};
use crate::chart::{
    ChartBackend, ChartKind, ChartLifecycleController, ChartSpec, LayoutReadinessGate, Readiness,
    SurfaceSize,
};
use crate::report::{SellerStats, UserReport};
use crate::series::{self, CalendarWindow};
use crate::services::report_api::ReportApi;
use crate::signals::{SignalSource, ThemeReactor, ViewportReactor};
use crate::theme::ThemeMode;

/// Series slot for the shopper's carbon-saved chart.
pub const CARBON_SAVED: &str = "carbon_saved";
/// Series slot for the shopper's carbon-used chart.
pub const CARBON_USED: &str = "carbon_used";
/// Series slot for the seller's revenue chart.
pub const REVENUE: &str = "revenue";

const SAVED_ACCENT: &str = "#10b981";
const USED_ACCENT: &str = "#ef4444";
const REVENUE_ACCENT: &str = "#10b981";

/// Static description of one chart slot a dashboard renders.
#[derive(Debug, Clone, Copy)]
pub struct SeriesPlan {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ChartKind,
    pub accent: &'static str,
}

const USER_PLAN: &[SeriesPlan] = &[
    SeriesPlan {
        name: CARBON_SAVED,
        label: "Carbon Saved (kg)",
        kind: ChartKind::Line,
        accent: SAVED_ACCENT,
    },
    SeriesPlan {
        name: CARBON_USED,
        label: "Carbon Used (kg)",
        kind: ChartKind::Line,
        accent: USED_ACCENT,
    },
];

const SELLER_PLAN: &[SeriesPlan] = &[SeriesPlan {
    name: REVENUE,
    label: "Revenue (₹)",
    kind: ChartKind::Bar,
    accent: REVENUE_ACCENT,
}];

/// The chart slots and window length a subject's dashboard renders.
pub fn render_plan(subject: Subject) -> (&'static [SeriesPlan], usize) {
    match subject {
        Subject::User => (USER_PLAN, USER_WINDOW_DAYS),
        Subject::Seller => (SELLER_PLAN, SELLER_WINDOW_DAYS),
    }
}

/// One projected series, keyed by its slot name.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesWindow {
    pub series: &'static str,
    pub window: CalendarWindow,
}

/// A fully projected view of one dashboard load, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub subject: Subject,
    pub as_of: NaiveDate,
    pub user_report: Option<UserReport>,
    pub seller_stats: Option<SellerStats>,
    pub windows: Vec<SeriesWindow>,
    pub degraded: Degraded,
    /// Messages surfaced to the viewer when sources fell back.
    pub notices: Vec<String>,
}

impl DashboardSnapshot {
    pub fn window(&self, series: &str) -> Option<&CalendarWindow> {
        self.windows
            .iter()
            .find(|w| w.series == series)
            .map(|w| &w.window)
    }
}

/// Projects an aggregated load onto the calendar windows of its subject's
/// render plan, as of `as_of`.
pub fn project_snapshot(data: &DashboardData, as_of: NaiveDate) -> DashboardSnapshot {
    match data {
        DashboardData::User(user) => {
            let windows = vec![
                SeriesWindow {
                    series: CARBON_SAVED,
                    window: series::project(&user.carbon_saved, USER_WINDOW_DAYS, as_of),
                },
                SeriesWindow {
                    series: CARBON_USED,
                    window: series::project(&user.carbon_used, USER_WINDOW_DAYS, as_of),
                },
            ];

            let mut notices = Vec::new();
            if user.degraded.report {
                notices.push("Failed to load eco report".to_string());
            }

            DashboardSnapshot {
                subject: Subject::User,
                as_of,
                user_report: user.report.clone(),
                seller_stats: None,
                windows,
                degraded: user.degraded,
                notices,
            }
        }
        DashboardData::Seller(seller) => {
            let windows = vec![SeriesWindow {
                series: REVENUE,
                window: series::project(&seller.revenue, SELLER_WINDOW_DAYS, as_of),
            }];

            let mut notices = Vec::new();
            if seller.degraded.report && seller.degraded.series && seller.degraded.products {
                notices.push("Failed to load dashboard".to_string());
            }

            DashboardSnapshot {
                subject: Subject::Seller,
                as_of,
                user_report: None,
                seller_stats: Some(seller.stats.clone()),
                windows,
                degraded: seller.degraded,
                notices,
            }
        }
    }
}

/// Splices the previous snapshot into `next` wherever a source degraded,
/// so a transient outage never blanks figures already on screen.
///
/// The seller stats block is carried as a unit when either of its sources
/// (report or product listings) degraded, since a half-zeroed card is
/// worse than a stale one.
fn carry_over_degraded(prev: Option<&DashboardSnapshot>, next: &mut DashboardSnapshot) {
    let Some(prev) = prev else { return };
    if prev.subject != next.subject {
        return;
    }

    match next.subject {
        Subject::User => {
            if next.degraded.report && next.user_report.is_none() && prev.user_report.is_some() {
                debug!("Keeping previous eco report across a failed refresh");
                next.user_report = prev.user_report.clone();
            }
        }
        Subject::Seller => {
            if (next.degraded.report || next.degraded.products) && prev.seller_stats.is_some() {
                debug!("Keeping previous seller figures across a failed refresh");
                next.seller_stats = prev.seller_stats.clone();
            }
        }
    }

    if next.degraded.series {
        for entry in &mut next.windows {
            if let Some(previous) = prev.window(entry.series) {
                debug!(series = entry.series, "Keeping previous series window");
                entry.window = previous.clone();
            }
        }
    }
}

enum SessionEvent {
    ThemeChanged(ThemeMode),
    Resized(SurfaceSize),
    RefreshDue,
    SignalClosed,
}

/// Owns one dashboard end to end: aggregation, projection, chart
/// lifecycle, and the environment signals that keep the charts current.
pub struct DashboardSession<A, B: ChartBackend> {
    subject: Subject,
    aggregator: ReportAggregator<A>,
    controller: ChartLifecycleController<B>,
    surfaces: Vec<(&'static str, B::Surface)>,
    gate: LayoutReadinessGate,
    theme: ThemeMode,
    theme_reactor: ThemeReactor,
    viewport_reactor: ViewportReactor,
    snapshot: Option<DashboardSnapshot>,
    torn_down: bool,
}

impl<A: ReportApi, B: ChartBackend> DashboardSession<A, B> {
    /// Creates a session subscribed to both environment signals.
    ///
    /// `surfaces` maps series slot names to the surfaces their charts draw
    /// into; slots without a surface are skipped at build time.
    pub fn new(
        subject: Subject,
        api: A,
        backend: B,
        surfaces: Vec<(&'static str, B::Surface)>,
        theme_signal: &SignalSource<ThemeMode>,
        viewport_signal: &SignalSource<SurfaceSize>,
    ) -> Self {
        Self {
            subject,
            aggregator: ReportAggregator::new(api),
            controller: ChartLifecycleController::new(backend),
            surfaces,
            gate: LayoutReadinessGate::default(),
            theme: theme_signal.current(),
            theme_reactor: ThemeReactor::attach(theme_signal),
            viewport_reactor: ViewportReactor::attach(viewport_signal),
            snapshot: None,
            torn_down: false,
        }
    }

    /// Replaces the layout readiness gate. Mostly useful for shortening
    /// waits in tests.
    pub fn with_gate(mut self, gate: LayoutReadinessGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn charts(&self) -> &ChartLifecycleController<B> {
        &self.controller
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// First load: fetches every source, projects the snapshot, and builds
    /// the charts. Degraded sources are reported, never fatal.
    #[tracing::instrument(skip(self), fields(subject = self.subject.as_str()))]
    pub async fn activate(&mut self) {
        if self.torn_down {
            warn!("Ignoring activate on a torn-down session");
            return;
        }

        info!("Activating dashboard");
        let data = self.aggregator.fetch_all(self.subject).await;
        let snapshot = project_snapshot(&data, today());
        self.report_notices(&snapshot);
        self.snapshot = Some(snapshot);
        self.build_charts().await;
    }

    /// Re-fetches every source and refreshes the charts in place.
    ///
    /// Live charts receive the new data through an update; slots that
    /// never built get another build attempt. Sources that fail keep the
    /// figures from the previous snapshot.
    #[tracing::instrument(skip(self), fields(subject = self.subject.as_str()))]
    pub async fn refresh(&mut self) {
        if self.torn_down {
            warn!("Ignoring refresh on a torn-down session");
            return;
        }

        debug!("Refreshing dashboard");
        let data = self.aggregator.fetch_all(self.subject).await;
        let mut snapshot = project_snapshot(&data, today());
        carry_over_degraded(self.snapshot.as_ref(), &mut snapshot);
        self.report_notices(&snapshot);
        self.snapshot = Some(snapshot);
        self.sync_charts().await;
    }

    /// Destroys and reconstructs every chart from the current snapshot.
    ///
    /// Used when presentation state changes underneath the charts (theme
    /// transitions, viewport resizes) and an in-place data update cannot
    /// pick the change up.
    pub async fn force_rebuild(&mut self, reason: &str) {
        if self.torn_down {
            return;
        }
        info!(reason, "Rebuilding dashboard charts");
        self.build_charts().await;
    }

    /// Drives the session: applies theme transitions and viewport resizes
    /// as forced rebuilds, and re-fetches on the refresh interval.
    ///
    /// Returns once the session is torn down or every signal source is
    /// gone.
    pub async fn run(&mut self, refresh_every: Duration) {
        let mut ticker = tokio::time::interval(refresh_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick resolves immediately; activation already loaded
        ticker.tick().await;

        loop {
            if self.torn_down {
                break;
            }
            match self.next_event(&mut ticker).await {
                SessionEvent::ThemeChanged(mode) => {
                    info!(mode = mode.as_str(), "Theme changed");
                    self.theme = mode;
                    self.force_rebuild("theme transition").await;
                }
                SessionEvent::Resized(size) => {
                    info!(width = size.width, height = size.height, "Viewport resized");
                    self.force_rebuild("viewport resize").await;
                }
                SessionEvent::RefreshDue => self.refresh().await,
                SessionEvent::SignalClosed => {
                    if !self.theme_reactor.is_attached() && !self.viewport_reactor.is_attached() {
                        info!("All signal sources gone, stopping dashboard loop");
                        break;
                    }
                }
            }
        }
    }

    async fn next_event(&mut self, ticker: &mut Interval) -> SessionEvent {
        tokio::select! {
            transition = self.theme_reactor.next_transition(), if self.theme_reactor.is_attached() => {
                match transition {
                    Some(mode) => SessionEvent::ThemeChanged(mode),
                    None => SessionEvent::SignalClosed,
                }
            }
            resize = self.viewport_reactor.next_resize(), if self.viewport_reactor.is_attached() => {
                match resize {
                    Some(size) => SessionEvent::Resized(size),
                    None => SessionEvent::SignalClosed,
                }
            }
            _ = ticker.tick() => SessionEvent::RefreshDue,
        }
    }

    /// Tears the dashboard down: detaches both reactors and destroys every
    /// chart. Terminal; calling anything afterwards is a no-op.
    pub fn teardown(&mut self) {
        if self.torn_down {
            debug!("Teardown already done");
            return;
        }
        info!(subject = self.subject.as_str(), "Tearing down dashboard");
        self.theme_reactor.detach();
        self.viewport_reactor.detach();
        self.controller.destroy_all();
        self.torn_down = true;
    }

    fn report_notices(&self, snapshot: &DashboardSnapshot) {
        for notice in &snapshot.notices {
            warn!("{notice}");
        }
    }

    /// Chart specs for every slot of the current snapshot, under the
    /// current theme.
    fn chart_specs(&self) -> Vec<(&'static str, ChartSpec)> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        let palette = self.theme.palette();
        let (plan, _) = render_plan(self.subject);
        plan.iter()
            .filter_map(|p| {
                snapshot.window(p.name).map(|window| {
                    (
                        p.name,
                        ChartSpec::new(p.kind, p.label, p.accent, palette, window),
                    )
                })
            })
            .collect()
    }

    async fn build_charts(&mut self) {
        for (name, spec) in self.chart_specs() {
            Self::rebuild_ready(&self.gate, &mut self.controller, &self.surfaces, name, &spec)
                .await;
        }
    }

    /// Pushes the current snapshot into live charts and builds any slot
    /// that has no live chart yet.
    async fn sync_charts(&mut self) {
        for (name, spec) in self.chart_specs() {
            if self.controller.is_live(name) {
                if let Err(e) = self.controller.update(name, &spec.data) {
                    warn!(series = name, error = %e, "Chart update failed");
                }
            } else {
                Self::rebuild_ready(&self.gate, &mut self.controller, &self.surfaces, name, &spec)
                    .await;
            }
        }
    }

    /// Waits for the slot's surface to be laid out, then rebuilds its
    /// chart. An unready surface or a failed construction leaves the slot
    /// unbuilt; the next refresh tries again.
    async fn rebuild_ready(
        gate: &LayoutReadinessGate,
        controller: &mut ChartLifecycleController<B>,
        surfaces: &[(&'static str, B::Surface)],
        series: &'static str,
        spec: &ChartSpec,
    ) {
        let Some((_, surface)) = surfaces.iter().find(|(name, _)| *name == series) else {
            warn!(series, "No surface registered for series");
            return;
        };

        match gate.await_ready(surface).await {
            Readiness::Ready(_) => {
                if let Err(e) = controller.rebuild(series, surface, spec) {
                    warn!(series, error = %e, "Chart construction failed");
                }
            }
            Readiness::Abandoned { last_measured } => {
                warn!(
                    series,
                    width = last_measured.width,
                    height = last_measured.height,
                    "Surface never became ready, skipping chart"
                );
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{SellerDashboard, UserDashboard};
    use crate::series::RawPoint;

    #[test]
    fn test_render_plan_shapes() {
        let (plan, window) = render_plan(Subject::User);
        assert_eq!(plan.len(), 2);
        assert_eq!(window, USER_WINDOW_DAYS);
        assert!(plan.iter().all(|p| p.kind == ChartKind::Line));

        let (plan, window) = render_plan(Subject::Seller);
        assert_eq!(plan.len(), 1);
        assert_eq!(window, SELLER_WINDOW_DAYS);
        assert_eq!(plan[0].kind, ChartKind::Bar);
    }

    #[test]
    fn test_project_snapshot_user_fills_both_windows() {
        let data = DashboardData::User(UserDashboard {
            report: Some(UserReport::default()),
            carbon_saved: vec![RawPoint::new("2025-03-10", 2.0)],
            carbon_used: Vec::new(),
            degraded: Degraded::default(),
        });

        let snapshot = project_snapshot(&data, day(2025, 3, 10));

        assert_eq!(snapshot.subject, Subject::User);
        assert_eq!(snapshot.windows.len(), 2);
        let saved = snapshot.window(CARBON_SAVED).unwrap();
        assert_eq!(saved.len(), USER_WINDOW_DAYS);
        assert_eq!(saved.value_on(day(2025, 3, 10)), Some(2.0));
        assert_eq!(snapshot.window(CARBON_USED).unwrap().len(), USER_WINDOW_DAYS);
        assert!(snapshot.notices.is_empty());
    }

    #[test]
    fn test_project_snapshot_degraded_report_adds_notice() {
        let data = DashboardData::User(UserDashboard {
            degraded: Degraded {
                report: true,
                ..Default::default()
            },
            ..Default::default()
        });

        let snapshot = project_snapshot(&data, day(2025, 3, 10));

        assert_eq!(snapshot.notices, vec!["Failed to load eco report"]);
        // series still project to full, zero-filled windows
        assert_eq!(snapshot.window(CARBON_USED).unwrap().len(), USER_WINDOW_DAYS);
    }

    #[test]
    fn test_project_snapshot_seller_total_outage_adds_notice() {
        let data = DashboardData::Seller(SellerDashboard {
            degraded: Degraded {
                report: true,
                series: true,
                products: true,
            },
            ..Default::default()
        });

        let snapshot = project_snapshot(&data, day(2025, 3, 10));

        assert_eq!(snapshot.notices, vec!["Failed to load dashboard"]);
        assert_eq!(snapshot.window(REVENUE).unwrap().len(), SELLER_WINDOW_DAYS);
    }

    #[test]
    fn test_project_snapshot_partial_seller_outage_has_no_notice() {
        let data = DashboardData::Seller(SellerDashboard {
            degraded: Degraded {
                report: true,
                ..Default::default()
            },
            ..Default::default()
        });

        let snapshot = project_snapshot(&data, day(2025, 3, 10));

        assert!(snapshot.notices.is_empty());
    }

    #[test]
    fn test_carry_over_keeps_previous_report() {
        let prev = project_snapshot(&healthy_user(), day(2025, 3, 9));
        let mut next = project_snapshot(
            &DashboardData::User(UserDashboard {
                degraded: Degraded {
                    report: true,
                    ..Default::default()
                },
                carbon_saved: vec![RawPoint::new("2025-03-10", 9.0)],
                ..Default::default()
            }),
            day(2025, 3, 10),
        );

        carry_over_degraded(Some(&prev), &mut next);

        assert_eq!(next.user_report.as_ref().map(|r| r.user_id), Some(7));
        // the healthy series source is not touched
        assert_eq!(
            next.window(CARBON_SAVED).unwrap().value_on(day(2025, 3, 10)),
            Some(9.0)
        );
    }

    #[test]
    fn test_carry_over_keeps_previous_windows() {
        let prev = project_snapshot(&healthy_user(), day(2025, 3, 9));
        let mut next = project_snapshot(
            &DashboardData::User(UserDashboard {
                report: Some(UserReport::default()),
                degraded: Degraded {
                    series: true,
                    ..Default::default()
                },
                ..Default::default()
            }),
            day(2025, 3, 10),
        );

        carry_over_degraded(Some(&prev), &mut next);

        // the previous window, ending the day before, is kept whole
        assert_eq!(
            next.window(CARBON_SAVED).unwrap().value_on(day(2025, 3, 9)),
            Some(4.0)
        );
        // the fresh report is not overwritten
        assert_eq!(next.user_report.as_ref().map(|r| r.user_id), Some(0));
    }

    #[test]
    fn test_carry_over_keeps_seller_stats_block() {
        let prev = project_snapshot(&healthy_seller(), day(2025, 3, 9));
        let mut next = project_snapshot(
            &DashboardData::Seller(SellerDashboard {
                degraded: Degraded {
                    products: true,
                    ..Default::default()
                },
                ..Default::default()
            }),
            day(2025, 3, 10),
        );

        carry_over_degraded(Some(&prev), &mut next);

        assert_eq!(
            next.seller_stats.as_ref().map(|s| s.total_orders),
            Some(42)
        );
    }

    #[test]
    fn test_carry_over_ignores_subject_mismatch() {
        let prev = project_snapshot(&healthy_seller(), day(2025, 3, 9));
        let mut next = project_snapshot(
            &DashboardData::User(UserDashboard {
                degraded: Degraded {
                    report: true,
                    ..Default::default()
                },
                ..Default::default()
            }),
            day(2025, 3, 10),
        );

        carry_over_degraded(Some(&prev), &mut next);

        assert!(next.user_report.is_none());
    }

    #[test]
    fn test_carry_over_without_previous_is_a_no_op() {
        let mut next = project_snapshot(
            &DashboardData::User(UserDashboard {
                degraded: Degraded {
                    report: true,
                    series: true,
                    ..Default::default()
                },
                ..Default::default()
            }),
            day(2025, 3, 10),
        );

        carry_over_degraded(None, &mut next);

        assert!(next.user_report.is_none());
        assert_eq!(next.window(CARBON_SAVED).unwrap().len(), USER_WINDOW_DAYS);
    }

    fn healthy_user() -> DashboardData {
        DashboardData::User(UserDashboard {
            report: Some(UserReport {
                user_id: 7,
                ..Default::default()
            }),
            carbon_saved: vec![RawPoint::new("2025-03-09", 4.0)],
            carbon_used: vec![RawPoint::new("2025-03-09", 1.0)],
            degraded: Degraded::default(),
        })
    }

    fn healthy_seller() -> DashboardData {
        DashboardData::Seller(SellerDashboard {
            stats: SellerStats {
                total_products: 3,
                total_orders: 42,
                ..Default::default()
            },
            revenue: vec![RawPoint::new("2025-03-09", 250.0)],
            degraded: Degraded::default(),
        })
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
