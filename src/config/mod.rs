//! Runtime configuration
//!
//! Upstream endpoints, required request headers, timeouts and the locator
//! file. Defaults target the live tax authority and business registry; every
//! value can be overridden through `COMPANY_INTEL_*` environment variables
//! (a `.env` file is honoured).

pub mod locators;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
pub use locators::{CompiledLocators, Locators};

pub const DEFAULT_TAX_SEARCH_URL: &str =
    "https://www.rs.ge/RsGe.Module/TaxpayersRegistry/GrdSearchTaxPayers";
pub const DEFAULT_TAX_PUBLIC_INFO_URL: &str = "https://xdata.rs.ge/TaxPayer/PublicInfo";
pub const DEFAULT_REGISTRY_URL: &str = "https://enreg.reestri.gov.ge/_dea/main.php";
pub const DEFAULT_REGISTRY_ORIGIN: &str = "https://enreg.reestri.gov.ge";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CompanyInfoFetcher/1.0)";
pub const DEFAULT_TAX_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REGISTRY_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3010";

const ENV_PREFIX: &str = "COMPANY_INTEL_";

/// Configuration for both upstream sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelConfig {
    pub tax_search_url: String,
    pub tax_public_info_url: String,
    pub registry_url: String,
    pub registry_origin: String,
    pub user_agent: String,
    pub tax_timeout_ms: u64,
    pub registry_timeout_ms: u64,
    pub bind_addr: String,
    /// Replaces the embedded locator set when present
    pub locators_path: Option<PathBuf>,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            tax_search_url: DEFAULT_TAX_SEARCH_URL.to_string(),
            tax_public_info_url: DEFAULT_TAX_PUBLIC_INFO_URL.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_origin: DEFAULT_REGISTRY_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tax_timeout_ms: DEFAULT_TAX_TIMEOUT_MS,
            registry_timeout_ms: DEFAULT_REGISTRY_TIMEOUT_MS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            locators_path: None,
        }
    }
}

impl IntelConfig {
    /// Load from the process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (full variable names)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(v) = var("TAX_SEARCH_URL") {
            config.tax_search_url = v;
        }
        if let Some(v) = var("TAX_PUBLIC_INFO_URL") {
            config.tax_public_info_url = v;
        }
        if let Some(v) = var("REGISTRY_URL") {
            config.registry_url = v;
        }
        if let Some(v) = var("REGISTRY_ORIGIN") {
            config.registry_origin = v;
        }
        if let Some(v) = var("USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = var("TAX_TIMEOUT_MS") {
            config.tax_timeout_ms = parse_millis("TAX_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("REGISTRY_TIMEOUT_MS") {
            config.registry_timeout_ms = parse_millis("REGISTRY_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = var("LOCATORS_PATH") {
            config.locators_path = Some(PathBuf::from(v));
        }

        Ok(config)
    }

    /// Point every upstream at one base URL (local mirrors and tests)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            tax_search_url: format!("{base}/RsGe.Module/TaxpayersRegistry/GrdSearchTaxPayers"),
            tax_public_info_url: format!("{base}/TaxPayer/PublicInfo"),
            registry_url: format!("{base}/_dea/main.php"),
            registry_origin: base.to_string(),
            ..Self::default()
        }
    }

    pub fn tax_timeout(&self) -> Duration {
        Duration::from_millis(self.tax_timeout_ms)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_millis(self.registry_timeout_ms)
    }

    /// Referer sent with the registry search request
    pub fn registry_search_referer(&self) -> String {
        format!("{}?m=new_index", self.registry_url)
    }

    /// Referer the application page expects: the entity page it is linked from
    pub fn registry_entity_referer(&self) -> String {
        format!("{}?c=app&m=show_legal_person", self.registry_url)
    }

    /// Load and compile the configured locator set
    pub fn load_locators(&self) -> Result<CompiledLocators, ConfigError> {
        let locators = match &self.locators_path {
            Some(path) => Locators::from_file(path)?,
            None => Locators::embedded()?,
        };
        locators.compile()
    }
}

fn parse_millis(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidVar {
            var: format!("{ENV_PREFIX}{name}"),
            message: "timeout must be greater than zero".to_string(),
        }),
        Ok(ms) => Ok(ms),
        Err(e) => Err(ConfigError::InvalidVar {
            var: format!("{ENV_PREFIX}{name}"),
            message: e.to_string(),
        }),
    }
}
