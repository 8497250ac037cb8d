//! ## Structure
//!
//! - [`config`] - CLI / environment configuration.
//! - [`telemetry`] - log subscriber setup.
//! - [`error`] - request errors and their HTTP representation.
//! - [`model`] - stored records and request payloads.
//! - [`store`] - in-memory tables shared by all requests.
//! - [`service`] - post, comment and like operations.
//! - [`routes`] - axum router and handlers.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;
pub mod telemetry;
