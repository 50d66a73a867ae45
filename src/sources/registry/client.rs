//! Registry-Source Pipeline
//!
//! search -> entity detail -> (concurrent) application details.
//!
//! The search and detail steps run strictly in order and either of them
//! failing aborts the registry's contribution (`Err`). A search page without a
//! usable handle is a clean [`RegistryRecord::NotFound`]. Application pages
//! are fetched concurrently and settle independently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use super::application::ApplicationFetcher;
use super::entity::{parse_entity_page, EntityPage};
use super::search::find_handle;
use super::types::{Application, ApplicationDetail, ApplicationStub, RegistryRecord};
use super::TARGET;
use crate::config::{CompiledLocators, IntelConfig};
use crate::error::{SourceError, Stage};
use crate::http::{HttpClient, HttpRequest, RawResponse};
use crate::sources::traits::{CompanyId, CompanySource};

/// Business registry source
pub struct RegistrySource {
    http: Arc<dyn HttpClient>,
    locators: Arc<CompiledLocators>,
    applications: ApplicationFetcher,
    registry_url: String,
    origin: String,
    search_referer: String,
    user_agent: String,
    timeout: Duration,
}

impl RegistrySource {
    pub fn new(
        http: Arc<dyn HttpClient>,
        locators: Arc<CompiledLocators>,
        config: &IntelConfig,
    ) -> Self {
        Self {
            applications: ApplicationFetcher::new(http.clone(), locators.clone(), config),
            http,
            locators,
            registry_url: config.registry_url.clone(),
            origin: config.registry_origin.clone(),
            search_referer: config.registry_search_referer(),
            user_agent: config.user_agent.clone(),
            timeout: config.registry_timeout(),
        }
    }

    /// Run the full pipeline for one identifier
    pub async fn fetch_registry_record(
        &self,
        id: &CompanyId,
    ) -> Result<RegistryRecord, SourceError> {
        tracing::info!(target: TARGET, "Searching registry for {}", id);

        let search_page = self.search(id).await?;
        let Some(handle) = find_handle(&search_page.body, id, &self.locators) else {
            tracing::info!(target: TARGET, "No registry record for {}", id);
            return Ok(RegistryRecord::NotFound {
                company_id: id.to_string(),
            });
        };

        tracing::info!(target: TARGET, "Found legal_code_id {} for {}", handle, id);

        let detail_page = self.entity_detail(&handle).await?;
        let EntityPage {
            metadata,
            applications,
        } = parse_entity_page(&detail_page.body, &self.locators);

        tracing::info!(
            target: TARGET,
            "Fetching details for {} applications of {}",
            applications.len(),
            id
        );
        let applications = self.fetch_applications(applications).await;

        Ok(RegistryRecord::Found {
            company_id: id.to_string(),
            internal_handle: handle,
            entity_metadata: metadata,
            applications,
        })
    }

    async fn search(&self, id: &CompanyId) -> Result<RawResponse, SourceError> {
        let request = HttpRequest::post_form(
            &self.registry_url,
            [
                ("c", "search"),
                ("m", "find_legal_persons"),
                ("s_legal_person_idnumber", id.as_str()),
                ("s_legal_person_name", ""),
                ("s_legal_person_form", "0"),
                ("s_legal_person_email", ""),
            ],
        )
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("User-Agent", &self.user_agent)
        .header("Accept", "*/*")
        .header("Origin", &self.origin)
        .header("Referer", &self.search_referer)
        .timeout(self.timeout);

        self.fetch_page(Stage::RegistrySearch, request).await
    }

    async fn entity_detail(&self, handle: &str) -> Result<RawResponse, SourceError> {
        let request = HttpRequest::get(&self.registry_url)
            .query("c", "app")
            .query("m", "show_legal_person")
            .query("legal_code_id", handle)
            .query("enteredCaptcha", "1")
            .header("User-Agent", &self.user_agent)
            .header("Accept", "*/*")
            .header("Origin", &self.origin)
            .header("Referer", &self.search_referer)
            .timeout(self.timeout);

        self.fetch_page(Stage::RegistryDetail, request).await
    }

    async fn fetch_page(&self, stage: Stage, request: HttpRequest) -> Result<RawResponse, SourceError> {
        let response = self
            .http
            .send(request)
            .await
            .map_err(|source| SourceError::Transport { stage, source })?;

        if !response.is_ok() {
            return Err(SourceError::UpstreamStatus {
                stage,
                status: response.status,
            });
        }
        Ok(response)
    }

    /// All-settled fan-out; output order follows `stubs`
    async fn fetch_applications(&self, stubs: Vec<ApplicationStub>) -> Vec<Application> {
        let handles: Vec<_> = stubs
            .iter()
            .map(|stub| {
                let fetcher = self.applications.clone();
                let app_id = stub.app_id.clone();
                tokio::spawn(async move { fetcher.fetch_application_detail(&app_id).await })
            })
            .collect();

        let settled = join_all(handles).await;

        stubs
            .into_iter()
            .zip(settled)
            .map(|(stub, outcome)| {
                let details = outcome.unwrap_or_else(|e| {
                    tracing::error!(
                        target: TARGET,
                        "Detail task for app_id {} did not complete: {}",
                        stub.app_id,
                        e
                    );
                    ApplicationDetail::failed("Failed to fetch/parse details", Some(e.to_string()))
                });
                Application { stub, details }
            })
            .collect()
    }
}

#[async_trait]
impl CompanySource for RegistrySource {
    type Record = RegistryRecord;

    fn source_id(&self) -> &'static str {
        "entrepreneurial-registry"
    }

    fn source_name(&self) -> &'static str {
        "Registry of entrepreneurial and non-entrepreneurial legal entities"
    }

    /// `None` on a fatal search or detail failure; `NotFound` is a record
    async fn lookup(&self, id: &CompanyId) -> Option<RegistryRecord> {
        match self.fetch_registry_record(id).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(target: TARGET, "Registry lookup failed for {}: {}", id, e);
                None
            }
        }
    }
}
