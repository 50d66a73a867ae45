//! Error taxonomy for the company-record pipeline
//!
//! Leaf-level irregularities (one application page, one missing field) are
//! represented as data by the pipelines and never reach these types. What is
//! left here is what a caller can actually observe.

use thiserror::Error;

/// Network-level failure reported by the HTTP client adapter.
///
/// A non-2xx status is *not* a `FetchError`; the adapter hands the status back
/// to the caller for interpretation.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Transport failure for {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Transport { url, .. }
            | Self::Body { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::Other { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Stage of a source pipeline, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TaxSearch,
    TaxPublicInfo,
    RegistrySearch,
    RegistryDetail,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaxSearch => write!(f, "tax-search"),
            Self::TaxPublicInfo => write!(f, "tax-public-info"),
            Self::RegistrySearch => write!(f, "registry-search"),
            Self::RegistryDetail => write!(f, "registry-detail"),
        }
    }
}

/// Failure of one step inside a source pipeline
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{stage}: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: FetchError,
    },

    #[error("{stage}: upstream returned status {status}")]
    UpstreamStatus { stage: Stage, status: u16 },

    #[error("{stage}: could not decode reply: {message}")]
    Decode { stage: Stage, message: String },
}

impl SourceError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Transport { stage, .. }
            | Self::UpstreamStatus { stage, .. }
            | Self::Decode { stage, .. } => *stage,
        }
    }
}

/// Errors surfaced by the aggregator to inbound adapters
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Company ID is required")]
    EmptyIdentifier,

    #[error("No information found for company ID '{company_id}' in any source")]
    NoInformation { company_id: String },
}

/// Configuration loading and locator compilation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidVar { var: String, message: String },

    #[error("Failed to read locator file {path}: {source}")]
    LocatorFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse locators: {0}")]
    LocatorParse(#[from] serde_yaml::Error),

    #[error("Unsupported locator version {found}, expected {expected}")]
    LocatorVersion { found: u32, expected: u32 },

    #[error("Invalid CSS selector for {name} ('{selector}'): {message}")]
    Selector {
        name: &'static str,
        selector: String,
        message: String,
    },

    #[error("Invalid pattern for {name}: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
