pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod upstream;

pub use config::Config;
pub use error::{DashboardError, ParseError, Result, TransportError};
