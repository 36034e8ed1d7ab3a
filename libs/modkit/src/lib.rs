//! # ModKit - shared HTTP toolkit for modules
//!
//! - RFC 9457 problem responses (`api::problem`)
//! - Traced outgoing HTTP client with W3C `traceparent` propagation (`http`)
//! - Process shutdown helpers (`runtime`)

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod http;
pub mod runtime;

pub use api::problem::{FieldViolation, Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use http::client::TracedClient;
pub use runtime::{cancel_on_signal, wait_for_shutdown};
