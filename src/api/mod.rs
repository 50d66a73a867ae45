//! REST API adapter
//!
//! Thin HTTP surface over the [`Aggregator`](crate::Aggregator). Handlers
//! translate query parameters into a [`CompanyId`](crate::CompanyId) and the
//! aggregator's outcome into status codes; no pipeline logic lives here.

pub mod company_routes;

pub use company_routes::create_company_router;
