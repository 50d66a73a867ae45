//! Registry markup locators
//!
//! Locators are versioned configuration data, not code: the default set is
//! embedded from `config/locators.yaml` and can be replaced by a file at
//! runtime. They are compiled once into selectors and regexes.

use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Locator file format version understood by this build
pub const LOCATOR_VERSION: u32 = 1;

const DEFAULT_LOCATORS: &str = include_str!("../../config/locators.yaml");

/// Raw locator definitions as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locators {
    pub version: u32,
    pub search: SearchLocators,
    pub entity: EntityLocators,
    pub application: ApplicationLocators,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLocators {
    pub handle_action_prefix: String,
    pub handle_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityLocators {
    pub identification_code: String,
    pub name: String,
    pub legal_form: String,
    pub registration_date: String,
    pub status: String,
    pub documents_label: String,
    #[serde(default)]
    pub documents: Vec<DocumentLinkLocator>,
    pub reporting_link_substring: String,
    pub application_rows: String,
    pub application_cells: usize,
    pub application_action_pattern: String,
}

/// Named document link, matched by a substring of the anchor text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLinkLocator {
    pub key: String,
    pub anchor_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationLocators {
    pub prepared_documents_caption: String,
    pub status_history_caption: String,
    pub scanned_documents_caption: String,
    pub metadata_caption_prefix: String,
    pub registration_number: String,
    pub service_type: String,
    pub service_cost: String,
    pub payable_balance: String,
    pub payment_rows: String,
    pub payment_cells: usize,
    pub debt_marker: String,
    pub applicant_region: String,
    pub applicant: String,
    pub representative: String,
    pub attached_documents: String,
    pub additional_documents: String,
    #[serde(default)]
    pub additional_documents_suffix: String,
    pub note: String,
}

impl Locators {
    /// The locator set shipped with the crate
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_LOCATORS)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let locators: Locators = serde_yaml::from_str(yaml)?;
        if locators.version != LOCATOR_VERSION {
            return Err(ConfigError::LocatorVersion {
                found: locators.version,
                expected: LOCATOR_VERSION,
            });
        }
        Ok(locators)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::LocatorFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Compile selectors and patterns. Fails on the first invalid entry.
    pub fn compile(self) -> Result<CompiledLocators, ConfigError> {
        let handle_pattern = pattern("search.handle_pattern", &self.search.handle_pattern)?;
        let application_action = pattern(
            "entity.application_action_pattern",
            &self.entity.application_action_pattern,
        )?;
        let application_rows = selector("entity.application_rows", &self.entity.application_rows)?;
        let payment_rows = selector("application.payment_rows", &self.application.payment_rows)?;
        let applicant_region = selector(
            "application.applicant_region",
            &self.application.applicant_region,
        )?;

        Ok(CompiledLocators {
            labels: self,
            handle_pattern,
            application_action,
            application_rows,
            payment_rows,
            applicant_region,
        })
    }
}

/// Locators ready for use by the extractor
#[derive(Debug, Clone)]
pub struct CompiledLocators {
    /// Literal labels and captions
    pub labels: Locators,
    pub handle_pattern: Regex,
    pub application_action: Regex,
    pub application_rows: Selector,
    pub payment_rows: Selector,
    pub applicant_region: Selector,
}

impl CompiledLocators {
    pub fn embedded() -> Result<Self, ConfigError> {
        Locators::embedded()?.compile()
    }
}

fn selector(name: &'static str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::Selector {
        name,
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn pattern(name: &'static str, re: &str) -> Result<Regex, ConfigError> {
    Regex::new(re).map_err(|source| ConfigError::Pattern { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_locators_compile() {
        let compiled = CompiledLocators::embedded().unwrap();
        assert_eq!(compiled.labels.version, LOCATOR_VERSION);
        assert_eq!(compiled.labels.entity.application_cells, 5);
        assert_eq!(compiled.labels.entity.documents.len(), 2);
        assert!(compiled
            .handle_pattern
            .is_match("show_legal_person(123456)"));
        assert!(compiled.application_action.is_match("show_app(987, 1)"));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let yaml = DEFAULT_LOCATORS.replacen("version: 1", "version: 2", 1);
        let err = Locators::from_yaml(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LocatorVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let mut locators = Locators::embedded().unwrap();
        locators.entity.application_rows = "table >>> tr[".into();
        let err = locators.compile().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Selector {
                name: "entity.application_rows",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut locators = Locators::embedded().unwrap();
        locators.search.handle_pattern = "show_legal_person((".into();
        assert!(matches!(
            locators.compile().unwrap_err(),
            ConfigError::Pattern { .. }
        ));
    }

    #[test]
    fn test_locators_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locators.yaml");
        std::fs::write(&path, DEFAULT_LOCATORS).unwrap();
        let locators = Locators::from_file(&path).unwrap();
        assert_eq!(locators.search.handle_action_prefix, "show_legal_person");

        let missing = Locators::from_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::LocatorFile { .. }));
    }
}
