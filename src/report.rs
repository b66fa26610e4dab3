//! Domain records returned by the EcoBazaar reporting endpoints.

use serde::{Deserialize, Serialize};

/// Badge shown for sellers that have no report yet.
pub const DEFAULT_SELLER_BADGE: &str = "New Seller";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A shopper's consolidated eco report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserReport {
    pub user_id: i64,
    pub user_name: String,
    pub total_purchase: i64,
    pub total_spent: f64,
    pub total_carbon_used: f64,
    pub total_carbon_saved: f64,
    pub eco_badge: String,
}

impl UserReport {
    /// Normalizes amounts at the API boundary: spend and carbon totals are
    /// rounded to two decimals.
    pub fn normalized(mut self) -> Self {
        self.total_spent = round2(self.total_spent);
        self.total_carbon_used = round2(self.total_carbon_used);
        self.total_carbon_saved = round2(self.total_carbon_saved);
        self
    }
}

/// Raw seller report payload.
///
/// The badge field name varies across backend versions, so both spellings
/// are accepted and resolved through [`SellerSummary::badge_name`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerSummary {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub eco_seller_badge: Option<String>,
    pub badge: Option<String>,
}

impl SellerSummary {
    pub fn badge_name(&self) -> &str {
        self.eco_seller_badge
            .as_deref()
            .or(self.badge.as_deref())
            .unwrap_or(DEFAULT_SELLER_BADGE)
    }
}

/// A product listing as returned by the seller catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub carbon_impact: f64,
    pub eco_certified: bool,
    pub eco_requested: bool,
}

/// Aggregated seller dashboard figures derived from the product listings
/// and the raw seller report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SellerStats {
    pub total_products: usize,
    pub certified: usize,
    pub pending_certification: usize,
    pub total_orders: i64,
    pub total_revenue: f64,
    pub badge: String,
}

impl SellerStats {
    /// Derives display figures from listings plus the raw summary.
    ///
    /// A product counts as pending certification only while its request is
    /// still open (`eco_requested` and not yet `eco_certified`). A missing
    /// summary yields zero orders, zero revenue, and the default badge.
    pub fn derive(products: &[Product], summary: Option<&SellerSummary>) -> Self {
        let certified = products.iter().filter(|p| p.eco_certified).count();
        let pending = products
            .iter()
            .filter(|p| p.eco_requested && !p.eco_certified)
            .count();

        SellerStats {
            total_products: products.len(),
            certified,
            pending_certification: pending,
            total_orders: summary.map(|s| s.total_orders).unwrap_or(0),
            total_revenue: round2(summary.map(|s| s.total_revenue).unwrap_or(0.0)),
            badge: summary
                .map(|s| s.badge_name().to_string())
                .unwrap_or_else(|| DEFAULT_SELLER_BADGE.to_string()),
        }
    }
}
