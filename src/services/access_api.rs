//! Trait for privileged-role access requests.

use anyhow::Result;

/// Result of submitting an access request.
///
/// A request that is already pending is not an error; the backend's
/// informational message is carried through for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The request was accepted and is now awaiting review.
    Submitted,
    /// A request for this account is already pending.
    AlreadyPending { message: String },
}

/// Abstraction over the role-request endpoints.
#[async_trait::async_trait]
pub trait AccessApi {
    /// Asks for admin privileges for the authenticated account.
    async fn request_admin_access(&self) -> Result<AccessOutcome>;

    /// Asks for seller privileges for the authenticated account.
    async fn request_seller_access(&self) -> Result<AccessOutcome>;
}
