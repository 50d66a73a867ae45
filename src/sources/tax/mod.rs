//! Revenue service (tax authority) source
//!
//! # Coverage
//!
//! - **Key type:** tax ID, sent as `tin` (search) and `IdentCode` (public info)
//! - **Provides:** entity name/type/status, registration data, directors, founders

mod client;
mod normalize;
mod types;

pub use client::TaxSource;
pub use normalize::merge_tax_record;
pub use types::{
    Director, Founder, PublicInfoReply, RawDirector, RawFounder, TaxRecord, TaxSearchReply,
    PUBLIC_INFO_SYSTEM_ERROR,
};
