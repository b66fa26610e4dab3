//! Concurrent report aggregation with per-source fallbacks.
//!
//! Every dashboard load fans out one request per data source and joins
//! the results. A failed source degrades to its fallback (missing report,
//! empty series) instead of failing the load, so a consolidated result is
//! always produced.

use serde::Serialize;
use tokio::join;
use tracing::warn;

use crate::report::{SellerStats, UserReport};
use crate::series::RawPoint;
use crate::services::report_api::ReportApi;

/// Days of history shown on the shopper dashboard.
pub const USER_WINDOW_DAYS: usize = 7;
/// Days of history shown on the seller dashboard.
pub const SELLER_WINDOW_DAYS: usize = 14;

/// Whose dashboard is being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    User,
    Seller,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::User => "user",
            Subject::Seller => "seller",
        }
    }
}

/// Which sources fell back during one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Degraded {
    pub report: bool,
    pub series: bool,
    pub products: bool,
}

impl Degraded {
    pub fn any(self) -> bool {
        self.report || self.series || self.products
    }
}

/// Consolidated shopper dashboard inputs.
#[derive(Debug, Clone, Default)]
pub struct UserDashboard {
    pub report: Option<UserReport>,
    pub carbon_saved: Vec<RawPoint>,
    pub carbon_used: Vec<RawPoint>,
    pub degraded: Degraded,
}

/// Consolidated seller dashboard inputs.
#[derive(Debug, Clone, Default)]
pub struct SellerDashboard {
    pub stats: SellerStats,
    pub revenue: Vec<RawPoint>,
    pub degraded: Degraded,
}

/// One fully aggregated dashboard load.
#[derive(Debug, Clone)]
pub enum DashboardData {
    User(UserDashboard),
    Seller(SellerDashboard),
}

impl DashboardData {
    pub fn subject(&self) -> Subject {
        match self {
            DashboardData::User(_) => Subject::User,
            DashboardData::Seller(_) => Subject::Seller,
        }
    }

    pub fn degraded(&self) -> Degraded {
        match self {
            DashboardData::User(u) => u.degraded,
            DashboardData::Seller(s) => s.degraded,
        }
    }
}

/// Fans out the per-source fetches for one dashboard and consolidates the
/// results.
pub struct ReportAggregator<A> {
    api: A,
}

impl<A: ReportApi> ReportAggregator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Aggregates every source for `subject`.
    ///
    /// Never fails: partial failures are logged, recorded in the result's
    /// `degraded` flags, and replaced by fallbacks.
    #[tracing::instrument(skip(self), fields(subject = subject.as_str()))]
    pub async fn fetch_all(&self, subject: Subject) -> DashboardData {
        match subject {
            Subject::User => DashboardData::User(self.fetch_user().await),
            Subject::Seller => DashboardData::Seller(self.fetch_seller().await),
        }
    }

    async fn fetch_user(&self) -> UserDashboard {
        let (report, weekly) = join!(self.api.user_report(), self.api.user_weekly());

        let mut degraded = Degraded::default();

        let report = match report {
            Ok(report) => Some(report.normalized()),
            Err(e) => {
                warn!(error = %e, "User report fetch failed, continuing without it");
                degraded.report = true;
                None
            }
        };

        let (carbon_saved, carbon_used) = match weekly {
            Ok(rows) => {
                let saved = rows
                    .iter()
                    .map(|r| RawPoint::new(r.day.clone(), r.saved))
                    .collect();
                let used = rows
                    .iter()
                    .map(|r| RawPoint::new(r.day.clone(), r.used))
                    .collect();
                (saved, used)
            }
            Err(e) => {
                warn!(error = %e, "Weekly eco series fetch failed, charts will render empty");
                degraded.series = true;
                (Vec::new(), Vec::new())
            }
        };

        UserDashboard {
            report,
            carbon_saved,
            carbon_used,
            degraded,
        }
    }

    async fn fetch_seller(&self) -> SellerDashboard {
        let (products, summary, sales) = join!(
            self.api.seller_products(),
            self.api.seller_report(),
            self.api.seller_sales(SELLER_WINDOW_DAYS as u32),
        );

        let mut degraded = Degraded::default();

        let products = match products {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "Product listing fetch failed, counting zero products");
                degraded.products = true;
                Vec::new()
            }
        };

        let summary = match summary {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Seller report fetch failed, falling back to defaults");
                degraded.report = true;
                None
            }
        };

        let revenue = match sales {
            Ok(rows) => rows
                .into_iter()
                .map(|r| RawPoint::new(r.day, r.revenue))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Sales series fetch failed, chart will render empty");
                degraded.series = true;
                Vec::new()
            }
        };

        let stats = SellerStats::derive(&products, summary.as_ref());

        SellerDashboard {
            stats,
            revenue,
            degraded,
        }
    }
}
