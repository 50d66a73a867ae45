//! Business registry source
//!
//! # Coverage
//!
//! - **Key type:** identification code, searched as `s_legal_person_idnumber`
//! - **Provides:** entity metadata, document links, applications with their
//!   documents, status history and payments
//!
//! The registry has no API. Everything comes from HTML pages reached through
//! a search page, an entity page and one page per application.

mod application;
mod client;
mod entity;
mod search;
mod types;

pub(crate) const TARGET: &str = "company_intel::registry";

pub use application::{parse_application_page, ApplicationFetcher};
pub use client::RegistrySource;
pub use entity::{parse_entity_page, EntityPage};
pub use search::find_handle;
pub use types::{
    Application, ApplicationDetail, ApplicationDetails, ApplicationMetadata, ApplicationStub,
    DetailError, EntityMetadata, Payment, PreparedDocument, RegistryRecord, ScannedDocument,
    StatusEntry,
};
