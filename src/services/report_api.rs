//! Trait and row types for the EcoBazaar reporting endpoints.

use anyhow::Result;
use serde::Deserialize;

use crate::report::{Product, SellerSummary, UserReport};

/// One day of the shopper's carbon series.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyEcoRow {
    /// Date key; encodings vary across backend versions.
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub saved: f64,
    #[serde(default)]
    pub used: f64,
}

/// One day of the seller's revenue series. Older backends key the row by
/// `date` instead of `day`.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesRow {
    #[serde(default, alias = "date")]
    pub day: String,
    #[serde(default)]
    pub revenue: f64,
}

/// Abstraction over the EcoBazaar reporting backend.
#[async_trait::async_trait]
pub trait ReportApi: Send + Sync {
    /// The shopper's consolidated eco report.
    async fn user_report(&self) -> Result<UserReport>;

    /// Daily carbon saved/used rows for the shopper.
    async fn user_weekly(&self) -> Result<Vec<WeeklyEcoRow>>;

    /// The seller's raw report (orders, revenue, badge).
    async fn seller_report(&self) -> Result<SellerSummary>;

    /// Daily revenue rows for the seller covering the last `days` days.
    async fn seller_sales(&self, days: u32) -> Result<Vec<SalesRow>>;

    /// The seller's product listings.
    async fn seller_products(&self) -> Result<Vec<Product>>;
}
