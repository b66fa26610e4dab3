//! Request decoration for authenticated endpoints.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use super::HttpClient;

/// An [`HttpClient`] wrapper that injects `Authorization: Bearer <token>`
/// into every request, the pattern the EcoBazaar backend expects for its
/// JWT session tokens.
pub struct BearerAuth<C> {
    inner: C,
    value: HeaderValue,
}

impl<C> BearerAuth<C> {
    /// Fails if the token contains characters that are not valid in an
    /// HTTP header value.
    pub fn new(inner: C, token: &str) -> anyhow::Result<Self> {
        let value = format!("Bearer {token}").parse()?;
        Ok(Self { inner, value })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for BearerAuth<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(AUTHORIZATION, self.value.clone());
        self.inner.execute(req).await
    }
}
