//! Upstream company-record sources
//!
//! Each source owns its request sequence and normalization and exposes the
//! [`CompanySource`] trait so adapters can call it on its own.

pub mod registry;
pub mod tax;
pub mod traits;

pub use registry::{RegistryRecord, RegistrySource};
pub use tax::{TaxRecord, TaxSource};
pub use traits::{CompanyId, CompanySource};
