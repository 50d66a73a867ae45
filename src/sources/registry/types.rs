//! Business registry record types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a registry lookup that reached a clean answer.
///
/// A failed search or detail step is not a `RegistryRecord`; the pipeline
/// reports it as an error instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RegistryRecord {
    /// The search page had no matching row with a usable handle
    NotFound { company_id: String },
    Found {
        company_id: String,
        /// Numeric id the registry assigns to the company (`legal_code_id`)
        internal_handle: String,
        entity_metadata: EntityMetadata,
        applications: Vec<Application>,
    },
}

impl RegistryRecord {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn applications(&self) -> &[Application] {
        match self {
            Self::Found { applications, .. } => applications,
            Self::NotFound { .. } => &[],
        }
    }
}

/// Scalar fields of the entity detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub identification_code: String,
    pub name: String,
    pub legal_form: String,
    pub registration_date: String,
    pub status_text: String,
    pub reporting_link: String,
    /// Named document links; keys present only when discovered
    pub documents: BTreeMap<String, String>,
}

/// Row of the entity page's application list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStub {
    pub app_id: String,
    pub registration_number: String,
    pub service_type: String,
    pub status: String,
    pub date: String,
}

/// Stub merged with its detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(flatten)]
    pub stub: ApplicationStub,
    pub details: ApplicationDetail,
}

/// Parsed application page, or a marker for a page that could not be used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationDetail {
    Parsed(ApplicationDetails),
    Failed(DetailError),
}

impl ApplicationDetail {
    pub fn failed(error: impl Into<String>, reason: Option<String>) -> Self {
        Self::Failed(DetailError {
            error: error.into(),
            reason,
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn parsed(&self) -> Option<&ApplicationDetails> {
        match self {
            Self::Parsed(details) => Some(details),
            Self::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Sections of an application page. Absent sections are empty, never missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    pub prepared_documents: Vec<PreparedDocument>,
    pub status_history: Vec<StatusEntry>,
    pub scanned_documents: Vec<ScannedDocument>,
    pub payments: Vec<Payment>,
    pub metadata: ApplicationMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedDocument {
    pub name: String,
    pub date: String,
    pub link: Option<String>,
    /// Format marker from the link icon (e.g. SIGNED, HTML)
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: String,
    pub date: String,
    pub status_text: String,
    pub decision: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedDocument {
    pub name: String,
    pub date: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub status: String,
    pub amount: String,
    pub bank: String,
    pub receipt_number: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    pub registration_number: String,
    pub service_type: String,
    pub service_cost_description: String,
    pub payable_amount_balance: String,
    pub applicant_name_id: String,
    pub applicant_address: String,
    pub representative_name_id: String,
    pub representative_address: String,
    pub attached_documents: Vec<String>,
    pub note: String,
}
