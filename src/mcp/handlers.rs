//! MCP Tool Handlers
//!
//! Each tool is a thin translation between `{companyID}` arguments and one
//! aggregator operation. Bad input and missing data come back as tool error
//! results, never as protocol errors.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::protocol::ToolCallResult;
use super::tools::{COMBINED_TOOL, REGISTRY_TOOL, TAX_TOOL};
use crate::aggregate::Aggregator;
use crate::error::{AggregateError, SourceError};
use crate::sources::CompanyId;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No usable data found from revenue service sources.")]
    NoTaxData,

    #[error("Error fetching registry info: {0}")]
    Registry(#[from] SourceError),

    #[error("{0}")]
    Aggregate(#[from] AggregateError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CompanyArgs {
    #[serde(rename = "companyID")]
    company_id: String,
}

/// Tool handlers over a shared aggregator
pub struct ToolHandlers {
    aggregator: Arc<Aggregator>,
}

impl ToolHandlers {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }

    /// Handle a tool call by name
    pub async fn handle(&self, name: &str, args: Value) -> ToolCallResult {
        match self.dispatch(name, args).await {
            Ok(v) => ToolCallResult::json(&v),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                ToolCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let id = match name {
            TAX_TOOL | REGISTRY_TOOL | COMBINED_TOOL => company_id(args)?,
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };

        match name {
            TAX_TOOL => {
                let record = self
                    .aggregator
                    .tax()
                    .fetch_tax_record(&id)
                    .await
                    .ok_or(ToolError::NoTaxData)?;
                Ok(serde_json::to_value(record)?)
            }
            REGISTRY_TOOL => {
                let record = self.aggregator.registry().fetch_registry_record(&id).await?;
                Ok(serde_json::to_value(record)?)
            }
            _ => {
                let info = self.aggregator.aggregate(&id).await;
                if !info.has_information() {
                    return Err(AggregateError::NoInformation {
                        company_id: info.company_id,
                    }
                    .into());
                }
                Ok(serde_json::to_value(info)?)
            }
        }
    }
}

fn company_id(args: Value) -> Result<CompanyId, ToolError> {
    let args: CompanyArgs = serde_json::from_value(args)
        .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    CompanyId::new(args.company_id).map_err(|e| ToolError::InvalidInput(e.to_string()))
}
