//! Domain core for the DICRI case workflow: lookup catalogs, authorization
//! policy, case lifecycle, evidence attachment rules and role-specific
//! projections, plus the `CaseStore` abstraction and the service that ties
//! them together.
//!
//! This crate is deliberately free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod case;
pub mod error;
pub mod evidence;
pub mod lifecycle;
pub mod lookup;
pub mod patch;
pub mod policy;
pub mod projection;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use service::CaseService;
