//! CLI entry point for the EcoBazaar dashboard renderer.
//!
//! Provides subcommands for one-shot chart rendering, a live watch mode
//! driven by a settings file, role access requests, and CSV export.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use eco_dashboard::aggregate::{ReportAggregator, Subject};
use eco_dashboard::chart::SurfaceSize;
use eco_dashboard::infra::ecobazaar::EcoBazaarClient;
use eco_dashboard::infra::settings::{DashboardSettings, SettingsWatcher};
use eco_dashboard::infra::svg::{SvgChartBackend, SvgSurface};
use eco_dashboard::services::access_api::{AccessApi, AccessOutcome};
use eco_dashboard::{
    output::{append_windows, print_json, print_summary},
    session::{DashboardSession, project_snapshot, render_plan},
    signals::SignalSource,
    theme::ThemeMode,
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "eco_dashboard")]
#[command(about = "Renders EcoBazaar analytics dashboards as SVG charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SubjectArg {
    /// Shopper dashboard: weekly carbon saved/used charts plus the eco report
    User,
    /// Seller dashboard: daily revenue chart plus listing and order figures
    Seller,
}

impl From<SubjectArg> for Subject {
    fn from(arg: SubjectArg) -> Self {
        match arg {
            SubjectArg::User => Subject::User,
            SubjectArg::Seller => Subject::Seller,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Seller,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a dashboard's charts once and exit
    Render {
        /// Whose dashboard to render
        #[arg(value_enum)]
        subject: SubjectArg,

        /// Directory to write SVG charts into
        #[arg(short, long, default_value = "charts")]
        out_dir: String,

        /// Chart width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Chart height in pixels
        #[arg(long, default_value_t = 360)]
        height: u32,
    },
    /// Keep a dashboard live: re-render on data refresh, theme changes, and resizes
    Watch {
        /// Whose dashboard to watch
        #[arg(value_enum)]
        subject: SubjectArg,

        /// Directory to write SVG charts into
        #[arg(short, long, default_value = "charts")]
        out_dir: String,

        /// Settings file carrying the theme flag and chart dimensions
        #[arg(short, long, default_value = "dashboard_settings.json")]
        settings: String,

        /// Seconds between data refreshes
        #[arg(short, long, default_value_t = 300)]
        refresh_rate: u64,

        /// Seconds between settings file polls
        #[arg(short, long, default_value_t = 2)]
        poll_rate: u64,
    },
    /// Submit an access request for a privileged role
    RequestAccess {
        /// Role to request
        #[arg(value_enum)]
        role: RoleArg,
    },
    /// Fetch a dashboard snapshot and append its series to a CSV file
    Export {
        /// Whose dashboard to export
        #[arg(value_enum)]
        subject: SubjectArg,

        /// CSV file to append rows to
        #[arg(short, long, default_value = "dashboard.csv")]
        output: String,

        /// Also log the snapshot as pretty-printed JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/eco_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("eco_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            subject,
            out_dir,
            width,
            height,
        } => {
            let subject = Subject::from(subject);
            let client = client_from_env()?;

            std::fs::create_dir_all(&out_dir)?;

            let theme = SignalSource::new(theme_from_env());
            let viewport = SignalSource::new(SurfaceSize::new(width, height));
            let surfaces = svg_surfaces(subject, &out_dir, &viewport);

            let mut session =
                DashboardSession::new(subject, client, SvgChartBackend, surfaces, &theme, &viewport);
            session.activate().await;

            if let Some(snapshot) = session.snapshot() {
                print_summary(snapshot);
            }
            info!(
                out_dir = %out_dir,
                charts = session.charts().live_count(),
                "Render complete"
            );
            session.teardown();
        }
        Commands::Watch {
            subject,
            out_dir,
            settings,
            refresh_rate,
            poll_rate,
        } => {
            let subject = Subject::from(subject);
            let client = client_from_env()?;

            std::fs::create_dir_all(&out_dir)?;

            let initial = match DashboardSettings::load(Path::new(&settings)) {
                Ok(loaded) => loaded,
                Err(e) => {
                    warn!(error = %e, "Settings file not loaded, starting with defaults");
                    DashboardSettings::default()
                }
            };

            let watcher = SettingsWatcher::new(&settings, Duration::from_secs(poll_rate), &initial);
            let surfaces = svg_surfaces(subject, &out_dir, watcher.viewport_signal());
            let mut session = DashboardSession::new(
                subject,
                client,
                SvgChartBackend,
                surfaces,
                watcher.theme_signal(),
                watcher.viewport_signal(),
            );
            tokio::spawn(watcher.run());

            session.activate().await;
            info!(refresh_rate, poll_rate, "Dashboard live. Press Ctrl+C to stop.");

            tokio::select! {
                _ = session.run(Duration::from_secs(refresh_rate)) => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupt received, shutting down"),
            }
            session.teardown();
        }
        Commands::RequestAccess { role } => {
            let client = client_from_env()?;

            let outcome = match role {
                RoleArg::Admin => client.request_admin_access().await?,
                RoleArg::Seller => client.request_seller_access().await?,
            };

            match outcome {
                AccessOutcome::Submitted => info!("Access request submitted for review"),
                AccessOutcome::AlreadyPending { message } => info!("{message}"),
            }
        }
        Commands::Export {
            subject,
            output,
            json,
        } => {
            let client = client_from_env()?;
            let aggregator = ReportAggregator::new(client);

            let data = aggregator.fetch_all(subject.into()).await;
            let snapshot = project_snapshot(&data, chrono::Local::now().date_naive());

            if json {
                print_json(&snapshot)?;
            } else {
                print_summary(&snapshot);
            }
            append_windows(&output, &snapshot)?;
            info!(output = %output, "Export complete");
        }
    }

    Ok(())
}

/// Builds an authenticated client from `ECOBAZAAR_API_URL` and
/// `ECOBAZAAR_API_TOKEN`.
fn client_from_env() -> Result<EcoBazaarClient> {
    let base_url = std::env::var("ECOBAZAAR_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let token = std::env::var("ECOBAZAAR_API_TOKEN").expect("ECOBAZAAR_API_TOKEN must be set");

    EcoBazaarClient::new(&base_url, &token)
}

fn theme_from_env() -> ThemeMode {
    ThemeMode::from_flag(&std::env::var("ECO_DASHBOARD_THEME").unwrap_or_default())
}

/// One SVG surface per series in the subject's render plan, under `out_dir`.
fn svg_surfaces(
    subject: Subject,
    out_dir: &str,
    viewport: &SignalSource<SurfaceSize>,
) -> Vec<(&'static str, SvgSurface)> {
    let (plan, _) = render_plan(subject);
    plan.iter()
        .map(|p| {
            let path = Path::new(out_dir).join(format!("{}.svg", p.name));
            (p.name, SvgSurface::new(path, viewport))
        })
        .collect()
}
