//! Aggregator
//!
//! Runs both sources for one identifier concurrently and merges whatever each
//! produced into a [`CombinedCompanyInfo`]. The two sources are independent
//! failure domains: either slot may be `null` while the other is populated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IntelConfig;
use crate::error::{AggregateError, ConfigError};
use crate::http::{HttpClient, ReqwestClient};
use crate::sources::{CompanyId, RegistryRecord, RegistrySource, TaxRecord, TaxSource};

const TARGET: &str = "company_intel::aggregate";

/// Combined output envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedCompanyInfo {
    pub company_id: String,
    pub revenue_service_info: Option<TaxRecord>,
    pub entrepreneurial_registry_info: Option<RegistryRecord>,
    pub last_updated: DateTime<Utc>,
}

impl CombinedCompanyInfo {
    /// False when the tax slot is empty and the registry slot is empty or
    /// `NotFound`
    pub fn has_information(&self) -> bool {
        self.revenue_service_info.is_some()
            || self
                .entrepreneurial_registry_info
                .as_ref()
                .is_some_and(RegistryRecord::is_found)
    }
}

/// Both sources behind one entry point
pub struct Aggregator {
    tax: TaxSource,
    registry: RegistrySource,
}

impl Aggregator {
    pub fn new(tax: TaxSource, registry: RegistrySource) -> Self {
        Self { tax, registry }
    }

    /// Live sources over a reqwest client
    pub fn from_config(config: &IntelConfig) -> Result<Self, ConfigError> {
        let http = Arc::new(ReqwestClient::new(&config.user_agent)?);
        Self::with_client(http, config)
    }

    /// Sources over an arbitrary transport
    pub fn with_client(http: Arc<dyn HttpClient>, config: &IntelConfig) -> Result<Self, ConfigError> {
        let locators = Arc::new(config.load_locators()?);
        Ok(Self {
            tax: TaxSource::new(http.clone(), config),
            registry: RegistrySource::new(http, locators, config),
        })
    }

    pub fn tax(&self) -> &TaxSource {
        &self.tax
    }

    pub fn registry(&self) -> &RegistrySource {
        &self.registry
    }

    /// Query both sources. Never fails; check [`CombinedCompanyInfo::has_information`].
    pub async fn aggregate(&self, id: &CompanyId) -> CombinedCompanyInfo {
        tracing::info!(target: TARGET, "Aggregating company info for {}", id);

        let (tax, registry) = tokio::join!(
            self.tax.fetch_tax_record(id),
            self.registry.fetch_registry_record(id)
        );

        let registry = match registry {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(target: TARGET, "Registry pipeline failed for {}: {}", id, e);
                None
            }
        };

        let info = CombinedCompanyInfo {
            company_id: id.to_string(),
            revenue_service_info: tax,
            entrepreneurial_registry_info: registry,
            last_updated: Utc::now(),
        };

        tracing::info!(
            target: TARGET,
            "Aggregated {}: tax={}, registry={}",
            id,
            info.revenue_service_info.is_some(),
            match &info.entrepreneurial_registry_info {
                Some(RegistryRecord::Found { .. }) => "found",
                Some(RegistryRecord::NotFound { .. }) => "not-found",
                None => "failed",
            }
        );

        info
    }

    /// Caller-facing lookup: validates the identifier and turns an envelope
    /// without data into [`AggregateError::NoInformation`]
    pub async fn lookup(&self, company_id: &str) -> Result<CombinedCompanyInfo, AggregateError> {
        let id = CompanyId::new(company_id)?;
        let info = self.aggregate(&id).await;
        if info.has_information() {
            Ok(info)
        } else {
            Err(AggregateError::NoInformation {
                company_id: info.company_id,
            })
        }
    }
}
