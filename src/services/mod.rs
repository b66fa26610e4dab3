//! Service traits decoupling the dashboard from backend transports.

pub mod access_api;
pub mod report_api;
