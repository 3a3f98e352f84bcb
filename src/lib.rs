//! Fashion photo aggregation and recommendation service.
//!
//! Photos come from a local catalog and the Pexels search API, blended at a
//! caller-chosen ratio. Recommendations turn liked photos into style keywords
//! through an OpenAI-compatible chat service and search for matching looks.
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
