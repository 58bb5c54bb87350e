//! Studio API
//!
//! HTTP surface of the media ingestion service, plus the services behind it and the
//! startup wiring.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
