//! Tax-Source Fetcher
//!
//! Two independent calls per identifier, issued together: the tabular
//! taxpayer search and the public-info lookup. Either may fail without
//! affecting the other; the record is merged from whatever was usable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::normalize::merge_tax_record;
use super::types::{PublicInfoReply, TaxRecord, TaxSearchReply};
use crate::config::IntelConfig;
use crate::error::{SourceError, Stage};
use crate::http::{HttpClient, HttpRequest, RawResponse};
use crate::sources::traits::{CompanyId, CompanySource};

const TARGET: &str = "company_intel::tax";

/// Tax authority (revenue service) source
pub struct TaxSource {
    http: Arc<dyn HttpClient>,
    search_url: String,
    public_info_url: String,
    user_agent: String,
    timeout: Duration,
}

impl TaxSource {
    pub fn new(http: Arc<dyn HttpClient>, config: &IntelConfig) -> Self {
        Self {
            http,
            search_url: config.tax_search_url.clone(),
            public_info_url: config.tax_public_info_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.tax_timeout(),
        }
    }

    /// Fetch and merge both replies. `None` when neither reply was usable.
    pub async fn fetch_tax_record(&self, id: &CompanyId) -> Option<TaxRecord> {
        tracing::info!(target: TARGET, "Fetching tax and public info for {}", id);

        let (search, public_info) = tokio::join!(self.search(id), self.public_info(id));

        let row = match search {
            Ok(Some(row)) => Some(row),
            Ok(None) => {
                tracing::warn!(target: TARGET, "Tax search for {} returned no rows", id);
                None
            }
            Err(e) => {
                tracing::error!(target: TARGET, "Tax search failed for {}: {}", id, e);
                None
            }
        };

        let info = match public_info {
            Ok(Some(info)) => Some(info),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(target: TARGET, "Public info failed for {}: {}", id, e);
                None
            }
        };

        if row.is_none() && info.is_none() {
            tracing::warn!(
                target: TARGET,
                "No usable data for {} in either tax search or public info",
                id
            );
            return None;
        }

        Some(merge_tax_record(row.as_deref(), info.as_ref()))
    }

    /// Tabular search; `Ok(None)` when the grid has no rows
    async fn search(&self, id: &CompanyId) -> Result<Option<Vec<Value>>, SourceError> {
        let request = HttpRequest::post_form(&self.search_url, [("tin", id.as_str())])
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self.send(Stage::TaxSearch, request).await?;
        let reply: TaxSearchReply = response.json().map_err(|e| SourceError::Decode {
            stage: Stage::TaxSearch,
            message: e.to_string(),
        })?;

        Ok(reply.into_first_row())
    }

    /// Public-info lookup; `Ok(None)` on the upstream's internal-error sentinel
    async fn public_info(&self, id: &CompanyId) -> Result<Option<PublicInfoReply>, SourceError> {
        let request = HttpRequest::get(&self.public_info_url)
            .query("IdentCode", id.as_str())
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self.send(Stage::TaxPublicInfo, request).await?;
        let reply: Option<PublicInfoReply> =
            response.json().map_err(|e| SourceError::Decode {
                stage: Stage::TaxPublicInfo,
                message: e.to_string(),
            })?;

        match reply {
            Some(reply) if reply.is_system_error() => {
                tracing::warn!(
                    target: TARGET,
                    "Public info for {} returned system error: {}",
                    id,
                    reply.message
                );
                Ok(None)
            }
            Some(reply) => Ok(Some(reply)),
            None => {
                tracing::warn!(target: TARGET, "Public info for {} returned an empty reply", id);
                Ok(None)
            }
        }
    }

    async fn send(&self, stage: Stage, request: HttpRequest) -> Result<RawResponse, SourceError> {
        let response = self
            .http
            .send(request)
            .await
            .map_err(|source| SourceError::Transport { stage, source })?;

        tracing::debug!(target: TARGET, "{} responded with status {}", stage, response.status);

        if !(200..300).contains(&response.status) {
            return Err(SourceError::UpstreamStatus {
                stage,
                status: response.status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CompanySource for TaxSource {
    type Record = TaxRecord;

    fn source_id(&self) -> &'static str {
        "revenue-service"
    }

    fn source_name(&self) -> &'static str {
        "Revenue Service taxpayer registry"
    }

    async fn lookup(&self, id: &CompanyId) -> Option<TaxRecord> {
        self.fetch_tax_record(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fixture::FixtureClient;
    use crate::http::Method;

    const SEARCH: &str = "/GrdSearchTaxPayers";
    const PUBLIC: &str = "/TaxPayer/PublicInfo";

    fn source(client: FixtureClient) -> (TaxSource, Arc<FixtureClient>) {
        let client = Arc::new(client);
        let config = IntelConfig::with_base_url("http://upstream.test");
        (TaxSource::new(client.clone(), &config), client)
    }

    fn id() -> CompanyId {
        CompanyId::new("404404404").unwrap()
    }

    const ROW_REPLY: &str =
        r#"{"Data":{"Rows":[["ACTIVE","LLC","Acme","","123","REG1","","2020-01-01"]]}}"#;

    #[tokio::test]
    async fn test_row_only_when_public_info_fails() {
        let (source, client) = source(
            FixtureClient::new()
                .respond(Method::Post, SEARCH, &[("tin", "404404404")], 200, ROW_REPLY)
                .refuse(Method::Get, PUBLIC, &[]),
        );

        let record = source.fetch_tax_record(&id()).await.unwrap();
        assert_eq!(record.status, "ACTIVE");
        assert_eq!(record.entity_type, "LLC");
        assert_eq!(record.name, "Acme");
        assert_eq!(record.id, "123");
        assert_eq!(record.registration_number, "REG1");
        assert_eq!(record.registration_date, "2020-01-01");

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.timeout, Duration::from_secs(10));
            assert!(request.header_value("User-Agent").is_some());
        }
    }

    #[tokio::test]
    async fn test_public_info_only_when_search_times_out() {
        let (source, _) = source(
            FixtureClient::new()
                .time_out(Method::Post, SEARCH, &[])
                .respond(
                    Method::Get,
                    PUBLIC,
                    &[("IdentCode", "404404404")],
                    200,
                    r#"{"id":"404404404","name":"Acme Public","legal_form":"LLC","status":"Active","address":"Tbilisi"}"#,
                ),
        );

        let record = source.fetch_tax_record(&id()).await.unwrap();
        assert_eq!(record.id, "404404404");
        assert_eq!(record.name, "Acme Public");
        assert_eq!(record.registration_number, "");
        assert_eq!(record.address, "Tbilisi");
    }

    #[tokio::test]
    async fn test_sentinel_and_empty_rows_is_none() {
        let (source, _) = source(
            FixtureClient::new()
                .respond(Method::Post, SEARCH, &[], 200, r#"{"Data":{"Rows":[]}}"#)
                .respond(
                    Method::Get,
                    PUBLIC,
                    &[],
                    200,
                    r#"{"Status":-100,"Message":"System error"}"#,
                ),
        );
        assert!(source.fetch_tax_record(&id()).await.is_none());
    }

    #[tokio::test]
    async fn test_both_transport_failures_is_none() {
        let (source, _) = source(FixtureClient::new());
        assert!(source.lookup(&id()).await.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_and_garbage_degrade() {
        let (source, _) = source(
            FixtureClient::new()
                .respond(Method::Post, SEARCH, &[], 500, "Internal Server Error")
                .respond(Method::Get, PUBLIC, &[], 200, "<html>not json</html>"),
        );
        assert!(source.fetch_tax_record(&id()).await.is_none());
    }
}
