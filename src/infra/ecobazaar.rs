//! Client for the EcoBazaar backend API.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::fetch::auth::BearerAuth;
use crate::fetch::{BasicClient, fetch_json, post_for_status};
use crate::report::{Product, SellerSummary, UserReport};
use crate::services::access_api::{AccessApi, AccessOutcome};
use crate::services::report_api::{ReportApi, SalesRow, WeeklyEcoRow};

/// Shown when a conflict response carries no message of its own.
const ALREADY_PENDING_FALLBACK: &str = "Request already pending";

/// Talks to one EcoBazaar deployment, authenticating every request with
/// the account's bearer token.
pub struct EcoBazaarClient {
    base_url: String,
    http: BearerAuth<BasicClient>,
}

impl EcoBazaarClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let basic = BasicClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(10))?;
        let http = BearerAuth::new(basic, token).context("invalid API token")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ReportApi for EcoBazaarClient {
    async fn user_report(&self) -> Result<UserReport> {
        fetch_json(&self.http, &self.url("/api/reports/user")).await
    }

    async fn user_weekly(&self) -> Result<Vec<WeeklyEcoRow>> {
        fetch_json(&self.http, &self.url("/api/reports/user/weekly")).await
    }

    async fn seller_report(&self) -> Result<SellerSummary> {
        fetch_json(&self.http, &self.url("/api/reports/seller")).await
    }

    async fn seller_sales(&self, days: u32) -> Result<Vec<SalesRow>> {
        let path = format!("/api/reports/seller/sales?days={days}");
        fetch_json(&self.http, &self.url(&path)).await
    }

    async fn seller_products(&self) -> Result<Vec<Product>> {
        fetch_json(&self.http, &self.url("/api/products/seller")).await
    }
}

#[async_trait]
impl AccessApi for EcoBazaarClient {
    async fn request_admin_access(&self) -> Result<AccessOutcome> {
        let (status, body) =
            post_for_status(&self.http, &self.url("/api/admin-request/request")).await?;
        interpret_access_response(status.as_u16(), &body, 409)
    }

    async fn request_seller_access(&self) -> Result<AccessOutcome> {
        let (status, body) =
            post_for_status(&self.http, &self.url("/api/seller-request/request")).await?;
        interpret_access_response(status.as_u16(), &body, 400)
    }
}

/// Interprets a role-request response.
///
/// `conflict_status` is the status this endpoint uses for "already
/// pending" (409 for admin requests, 400 for seller requests). The JSON
/// `message` field of a conflict body is carried through when present.
fn interpret_access_response(
    status: u16,
    body: &str,
    conflict_status: u16,
) -> Result<AccessOutcome> {
    if (200..300).contains(&status) {
        return Ok(AccessOutcome::Submitted);
    }

    if status == conflict_status {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| ALREADY_PENDING_FALLBACK.to_string());
        return Ok(AccessOutcome::AlreadyPending { message });
    }

    bail!("access request returned status {status}: {body}");
}
