//! Output formatting and persistence for dashboard snapshots.
//!
//! Supports summary logging, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::badge;
use crate::session::DashboardSnapshot;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a human-readable summary of the snapshot.
pub fn print_summary(snapshot: &DashboardSnapshot) {
    info!(
        subject = snapshot.subject.as_str(),
        as_of = %snapshot.as_of,
        "Dashboard snapshot"
    );

    if let Some(report) = &snapshot.user_report {
        let tier = badge::classify(&report.eco_badge, report.total_carbon_saved);
        info!(
            user = %report.user_name,
            purchases = report.total_purchase,
            spent = report.total_spent,
            carbon_saved = report.total_carbon_saved,
            carbon_used = report.total_carbon_used,
            badge = %report.eco_badge,
            tier = ?tier,
            badge_colors = %badge_colors(tier),
            "Eco report"
        );
    }

    if let Some(stats) = &snapshot.seller_stats {
        info!(
            products = stats.total_products,
            certified = stats.certified,
            pending_certification = stats.pending_certification,
            orders = stats.total_orders,
            revenue = stats.total_revenue,
            badge = %stats.badge,
            "Seller stats"
        );
    }

    for entry in &snapshot.windows {
        let total: f64 = entry.window.values().iter().sum();
        info!(
            series = entry.series,
            days = entry.window.len(),
            total,
            "Series window"
        );
    }

    for notice in &snapshot.notices {
        info!("Notice: {notice}");
    }
}

/// Gradient stops painted behind the badge name, as a "from to" pair.
fn badge_colors(tier: badge::BadgeTier) -> String {
    let (from, to) = tier.gradient();
    format!("{from} {to}")
}

/// Logs the snapshot as pretty-printed JSON.
pub fn print_json(snapshot: &DashboardSnapshot) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// One exported day of one series window.
#[derive(Debug, Serialize)]
struct WindowRow<'a> {
    exported_at: DateTime<Utc>,
    subject: &'a str,
    series: &'a str,
    date: NaiveDate,
    label: &'a str,
    value: f64,
}

/// Appends every day of every series window as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_windows(path: &str, snapshot: &DashboardSnapshot) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    let exported_at = Utc::now();
    for entry in &snapshot.windows {
        for day in entry.window.days() {
            writer.serialize(WindowRow {
                exported_at,
                subject: snapshot.subject.as_str(),
                series: entry.series,
                date: day.date,
                label: &day.label,
                value: day.value,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}
