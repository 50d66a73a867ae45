//! MCP Tool Definitions

use super::protocol::Tool;
use serde_json::{json, Value};

pub const TAX_TOOL: &str = "get_company_full_info";
pub const REGISTRY_TOOL: &str = "get_company_enreg_info";
pub const COMBINED_TOOL: &str = "get_combined_company_info";

fn company_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "companyID": {
                "type": "string",
                "description": "The company ID (Tax ID / Identification Code)"
            }
        },
        "required": ["companyID"]
    })
}

/// Get all available MCP tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: TAX_TOOL.into(),
            description: "Retrieves comprehensive company information (tax and public info) from the revenue service.".into(),
            input_schema: company_id_schema(),
        },
        Tool {
            name: REGISTRY_TOOL.into(),
            description: "Retrieves company registration details, documents and applications from the business registry.".into(),
            input_schema: company_id_schema(),
        },
        Tool {
            name: COMBINED_TOOL.into(),
            description: "Retrieves revenue service and business registry information merged into one record.".into(),
            input_schema: company_id_schema(),
        },
    ]
}
