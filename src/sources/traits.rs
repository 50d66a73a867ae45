//! CompanySource trait and the identifier type
//!
//! The common shape of the two upstream sources, so inbound adapters can call
//! either one on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AggregateError;

/// Tax ID / identification code: the sole lookup key.
///
/// Never empty; otherwise passed verbatim to both sources (no checksum or
/// format validation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyId(String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Result<Self, AggregateError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AggregateError::EmptyIdentifier);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CompanyId {
    type Error = AggregateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompanyId> for String {
    fn from(id: CompanyId) -> Self {
        id.0
    }
}

/// One upstream system that can describe a company
///
/// # Implementation Notes
///
/// - `lookup` degrades instead of failing wherever the upstream allows it;
///   leaf-level gaps become empty values inside the record.
/// - Each call re-fetches; there is no caching.
#[async_trait]
pub trait CompanySource: Send + Sync {
    /// Normalized record this source produces
    type Record: Serialize + Send;

    /// Unique identifier for this source (e.g., "revenue-service")
    fn source_id(&self) -> &'static str;

    /// Human-readable name
    fn source_name(&self) -> &'static str;

    /// Look up one company. `None` means "no usable data".
    async fn lookup(&self, id: &CompanyId) -> Option<Self::Record>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_id_rejects_empty() {
        assert!(matches!(
            CompanyId::new(""),
            Err(AggregateError::EmptyIdentifier)
        ));
    }

    #[test]
    fn test_company_id_is_verbatim() {
        // No trimming or format checks beyond non-emptiness
        let id = CompanyId::new(" 40 ").unwrap();
        assert_eq!(id.as_str(), " 40 ");
        assert_eq!(id.to_string(), " 40 ");
    }

    #[test]
    fn test_company_id_serde() {
        let id: CompanyId = serde_json::from_str("\"404404404\"").unwrap();
        assert_eq!(id.as_str(), "404404404");
        assert!(serde_json::from_str::<CompanyId>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"404404404\"");
    }
}
