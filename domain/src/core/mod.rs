//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: a validated user query
//! - [`error::DomainError`]: domain-level errors
//! - [`text`]: log previews

pub mod error;
pub mod query;
pub mod text;
