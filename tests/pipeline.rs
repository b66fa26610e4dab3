//! End-to-end dashboard pipeline tests: aggregation through projection to
//! chart lifecycle, with a stub backend API and a recording chart backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Local;
use eco_dashboard::aggregate::Subject;
use eco_dashboard::chart::spec::ZERO_EPSILON;
use eco_dashboard::chart::{
    ChartBackend, ChartData, ChartSpec, LayoutReadinessGate, Surface, SurfaceSize,
};
use eco_dashboard::report::{Product, SellerSummary, UserReport};
use eco_dashboard::services::report_api::{ReportApi, SalesRow, WeeklyEcoRow};
use eco_dashboard::session::{CARBON_SAVED, CARBON_USED, DashboardSession};
use eco_dashboard::signals::SignalSource;
use eco_dashboard::theme::ThemeMode;

#[tokio::test]
async fn test_user_activation_builds_every_chart() {
    let (backend, events, built) = RecordingBackend::new();
    let (surfaces, _size) = user_surfaces(SurfaceSize::new(800, 360));
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::new(800, 360));
    let mut session = DashboardSession::new(
        Subject::User,
        StubApi::default(),
        backend,
        surfaces,
        &theme,
        &viewport,
    );

    session.activate().await;

    assert_eq!(session.charts().live_count(), 2);
    assert_eq!(
        *events.borrow(),
        vec![Event::Construct(1), Event::Construct(2)]
    );

    let snapshot = session.snapshot().unwrap();
    assert!(!snapshot.degraded.any());
    assert_eq!(snapshot.user_report.as_ref().map(|r| r.user_id), Some(7));
    assert_eq!(snapshot.window(CARBON_SAVED).unwrap().len(), 7);
    assert_eq!(snapshot.window(CARBON_USED).unwrap().len(), 7);

    let built = built.borrow();
    assert_eq!(built[0].label, "Carbon Saved (kg)");
    assert_eq!(built[1].label, "Carbon Used (kg)");
    assert_eq!(built[0].measured, SurfaceSize::new(800, 360));
    // the stub's row for today lands on the last day of the window
    assert_eq!(built[0].values.last().copied(), Some(2.5));
    assert_eq!(built[1].values.last().copied(), Some(1.0));
}

#[tokio::test]
async fn test_series_outage_still_renders_baseline_charts() {
    let (backend, _events, built) = RecordingBackend::new();
    let (surfaces, _size) = user_surfaces(SurfaceSize::new(800, 360));
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::new(800, 360));
    let api = StubApi {
        fail_weekly: true,
        ..Default::default()
    };
    let mut session =
        DashboardSession::new(Subject::User, api, backend, surfaces, &theme, &viewport);

    session.activate().await;

    // both charts still build, showing the epsilon baseline
    assert_eq!(session.charts().live_count(), 2);
    let snapshot = session.snapshot().unwrap();
    assert!(snapshot.degraded.series);
    assert_eq!(snapshot.user_report.as_ref().map(|r| r.user_id), Some(7));

    let built = built.borrow();
    assert!(built[0].values.iter().all(|v| *v == ZERO_EPSILON));
    assert!(built[1].values.iter().all(|v| *v == ZERO_EPSILON));
}

#[tokio::test]
async fn test_theme_change_destroys_before_rebuilding() {
    let (backend, events, built) = RecordingBackend::new();
    let (surfaces, _size) = user_surfaces(SurfaceSize::new(800, 360));
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::new(800, 360));
    let mut session = DashboardSession::new(
        Subject::User,
        StubApi::default(),
        backend,
        surfaces,
        &theme,
        &viewport,
    );

    session.activate().await;
    events.borrow_mut().clear();

    theme.publish(ThemeMode::Dark);
    drop(theme);
    drop(viewport);

    // the loop applies the transition, then stops once both sources are gone
    session.run(Duration::from_secs(3600)).await;

    assert_eq!(session.theme(), ThemeMode::Dark);
    assert_eq!(
        *events.borrow(),
        vec![
            Event::Destroy(1),
            Event::Construct(3),
            Event::Destroy(2),
            Event::Construct(4)
        ]
    );

    let built = built.borrow();
    assert_eq!(built.last().unwrap().surface_token, "#111827");
}

#[tokio::test]
async fn test_resize_rebuilds_with_fresh_measurements() {
    let (backend, events, built) = RecordingBackend::new();
    let (surfaces, size) = user_surfaces(SurfaceSize::new(800, 360));
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::new(800, 360));
    let mut session = DashboardSession::new(
        Subject::User,
        StubApi::default(),
        backend,
        surfaces,
        &theme,
        &viewport,
    );

    session.activate().await;
    events.borrow_mut().clear();

    // layout applies the new size, then the resize event lands
    size.set(SurfaceSize::new(1024, 420));
    viewport.publish(SurfaceSize::new(1024, 420));
    drop(theme);
    drop(viewport);

    session.run(Duration::from_secs(3600)).await;

    assert_eq!(
        *events.borrow(),
        vec![
            Event::Destroy(1),
            Event::Construct(3),
            Event::Destroy(2),
            Event::Construct(4)
        ]
    );
    assert_eq!(
        built.borrow().last().unwrap().measured,
        SurfaceSize::new(1024, 420)
    );
}

#[tokio::test]
async fn test_unready_surface_builds_on_a_later_refresh() {
    let (backend, events, _built) = RecordingBackend::new();
    let (surfaces, size) = user_surfaces(SurfaceSize::ZERO);
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::ZERO);
    let mut session = DashboardSession::new(
        Subject::User,
        StubApi::default(),
        backend,
        surfaces,
        &theme,
        &viewport,
    )
    .with_gate(LayoutReadinessGate::new(3, Duration::from_millis(1)));

    session.activate().await;

    // never laid out: the gate gives up and no chart is built
    assert_eq!(session.charts().live_count(), 0);
    assert!(events.borrow().is_empty());

    size.set(SurfaceSize::new(800, 360));
    session.refresh().await;

    assert_eq!(session.charts().live_count(), 2);
    assert_eq!(
        *events.borrow(),
        vec![Event::Construct(1), Event::Construct(2)]
    );

    // once live, a further refresh updates in place
    session.refresh().await;
    assert_eq!(
        events.borrow()[2..].to_vec(),
        vec![Event::Update(1), Event::Update(2)]
    );
}

#[tokio::test]
async fn test_teardown_is_terminal() {
    let (backend, events, _built) = RecordingBackend::new();
    let (surfaces, _size) = user_surfaces(SurfaceSize::new(800, 360));
    let theme = SignalSource::new(ThemeMode::Light);
    let viewport = SignalSource::new(SurfaceSize::new(800, 360));
    let api = StubApi::default();
    let fetches = api.fetches.clone();
    let mut session =
        DashboardSession::new(Subject::User, api, backend, surfaces, &theme, &viewport);

    session.activate().await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    session.teardown();

    assert!(session.is_torn_down());
    assert_eq!(session.charts().live_count(), 0);
    let tail = events.borrow()[2..].to_vec();
    assert_eq!(tail.len(), 2);
    assert!(tail.contains(&Event::Destroy(1)));
    assert!(tail.contains(&Event::Destroy(2)));

    // every further call is a no-op
    session.teardown();
    session.activate().await;
    session.refresh().await;

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(events.borrow().len(), 4);
}

// Test doubles

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Construct(u32),
    Update(u32),
    Destroy(u32),
}

#[derive(Debug, Clone)]
struct Built {
    label: String,
    surface_token: &'static str,
    values: Vec<f64>,
    measured: SurfaceSize,
}

struct SharedSurface {
    size: Rc<Cell<SurfaceSize>>,
}

impl Surface for SharedSurface {
    fn measure(&self) -> SurfaceSize {
        self.size.get()
    }
}

fn user_surfaces(
    size: SurfaceSize,
) -> (Vec<(&'static str, SharedSurface)>, Rc<Cell<SurfaceSize>>) {
    let shared = Rc::new(Cell::new(size));
    let list = vec![
        (
            CARBON_SAVED,
            SharedSurface {
                size: shared.clone(),
            },
        ),
        (
            CARBON_USED,
            SharedSurface {
                size: shared.clone(),
            },
        ),
    ];
    (list, shared)
}

struct RecordingBackend {
    next_id: u32,
    events: Rc<RefCell<Vec<Event>>>,
    built: Rc<RefCell<Vec<Built>>>,
}

impl RecordingBackend {
    fn new() -> (Self, Rc<RefCell<Vec<Event>>>, Rc<RefCell<Vec<Built>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let built = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                next_id: 0,
                events: events.clone(),
                built: built.clone(),
            },
            events,
            built,
        )
    }
}

impl ChartBackend for RecordingBackend {
    type Surface = SharedSurface;
    type Handle = u32;

    fn construct(&mut self, surface: &SharedSurface, spec: &ChartSpec) -> Result<u32> {
        self.next_id += 1;
        self.events
            .borrow_mut()
            .push(Event::Construct(self.next_id));
        self.built.borrow_mut().push(Built {
            label: spec.series_label.clone(),
            surface_token: spec.palette.surface,
            values: spec.data.values.clone(),
            measured: surface.measure(),
        });
        Ok(self.next_id)
    }

    fn update(&mut self, handle: &mut u32, _data: &ChartData) -> Result<()> {
        self.events.borrow_mut().push(Event::Update(*handle));
        Ok(())
    }

    fn destroy(&mut self, handle: u32) {
        self.events.borrow_mut().push(Event::Destroy(handle));
    }
}

#[derive(Default)]
struct StubApi {
    fail_weekly: bool,
    fetches: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ReportApi for StubApi {
    async fn user_report(&self) -> Result<UserReport> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(UserReport {
            user_id: 7,
            user_name: "Asha".to_string(),
            total_purchase: 3,
            total_spent: 120.0,
            total_carbon_used: 4.0,
            total_carbon_saved: 9.5,
            eco_badge: "Green Hero".to_string(),
        })
    }

    async fn user_weekly(&self) -> Result<Vec<WeeklyEcoRow>> {
        if self.fail_weekly {
            bail!("weekly endpoint down");
        }
        let today = Local::now().date_naive().to_string();
        Ok(vec![WeeklyEcoRow {
            day: today,
            saved: 2.5,
            used: 1.0,
        }])
    }

    async fn seller_report(&self) -> Result<SellerSummary> {
        Ok(SellerSummary::default())
    }

    async fn seller_sales(&self, _days: u32) -> Result<Vec<SalesRow>> {
        Ok(Vec::new())
    }

    async fn seller_products(&self) -> Result<Vec<Product>> {
        Ok(Vec::new())
    }
}
