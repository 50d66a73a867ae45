//! Company lookup endpoints
//!
//! ## Endpoints
//!
//! - `GET /company/full-details?companyID=` - both sources merged
//! - `GET /rs/company-info?companyID=` - tax authority record or `null`
//! - `GET /enreg/company-info?companyID=` - business registry record or `null`
//! - `GET /health`

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregate::{Aggregator, CombinedCompanyInfo};
use crate::error::AggregateError;
use crate::sources::{CompanyId, CompanySource, RegistryRecord, TaxRecord};

type ApiError = (StatusCode, Json<Value>);

/// Query params shared by every lookup endpoint
#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    #[serde(rename = "companyID", default)]
    pub company_id: String,
}

impl CompanyQuery {
    fn id(&self) -> Result<CompanyId, ApiError> {
        CompanyId::new(self.company_id.as_str()).map_err(|e| {
            tracing::warn!("Rejected lookup: {}", e);
            bad_request(&e)
        })
    }
}

fn bad_request(e: &AggregateError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

/// GET /company/full-details
///
/// 400 on a missing or empty `companyID`, 404 when no source had data.
async fn full_details(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<CombinedCompanyInfo>, ApiError> {
    tracing::info!("Full details requested for '{}'", query.company_id);

    match aggregator.lookup(&query.company_id).await {
        Ok(info) => Ok(Json(info)),
        Err(e @ AggregateError::EmptyIdentifier) => Err(bad_request(&e)),
        Err(AggregateError::NoInformation { company_id }) => {
            tracing::warn!("No data from any source for {}", company_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "message": "No information found for this company ID in any source."
                })),
            ))
        }
    }
}

/// GET /rs/company-info
async fn tax_info(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Option<TaxRecord>>, ApiError> {
    let id = query.id()?;
    Ok(Json(aggregator.tax().fetch_tax_record(&id).await))
}

/// GET /enreg/company-info
///
/// A failed search or detail step is reported as `null`, like the combined
/// endpoint's registry slot.
async fn registry_info(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Option<RegistryRecord>>, ApiError> {
    let id = query.id()?;
    Ok(Json(aggregator.registry().lookup(&id).await))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the company lookup router
pub fn create_company_router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/company/full-details", get(full_details))
        .route("/rs/company-info", get(tax_info))
        .route("/enreg/company-info", get(registry_info))
        .route("/health", get(health))
        .with_state(aggregator)
}
