pub mod aggregate;
pub mod badge;
pub mod chart;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod report;
pub mod series;
pub mod services;
pub mod session;
pub mod signals;
pub mod theme;
