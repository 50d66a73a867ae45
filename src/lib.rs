//! company-intel - Company registry aggregation
//!
//! Looks up one company identifier in two upstream systems and merges the
//! results into a single record:
//!
//! - the tax authority (JSON taxpayer search + public-info lookup)
//! - the business registry (HTML search, entity and application pages)
//!
//! ## Pipeline
//! identifier -> (tax fetch || registry search -> detail -> applications) -> combined record
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use company_intel::{Aggregator, IntelConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IntelConfig::from_env()?;
//! let aggregator = Aggregator::from_config(&config)?;
//! let info = aggregator.lookup("404404404").await?;
//! println!("{}", serde_json::to_string_pretty(&info)?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Endpoints, timeouts, locators
pub mod config;

// Outbound transport
pub mod http;

// Literal-text keyed HTML lookups
pub mod extract;

// Tax authority and business registry
pub mod sources;

pub mod aggregate;

// REST adapter (when enabled)
#[cfg(feature = "server")]
pub mod api;

// JSON-RPC tool-call adapter over stdio
#[cfg(feature = "mcp")]
pub mod mcp;

pub use aggregate::{Aggregator, CombinedCompanyInfo};
pub use config::IntelConfig;
pub use error::{AggregateError, ConfigError, FetchError, SourceError};
pub use sources::{CompanyId, CompanySource, RegistryRecord, TaxRecord};
