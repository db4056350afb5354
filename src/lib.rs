//! CNPJ Enrichment Library
//!
//! This library looks up CNPJ numbers in the ReceitaWS business registry,
//! flattens the responses into a semicolon-delimited file, and ranks the
//! resulting records by how often their opening date recurs.
//!
//! # Modules
//!
//! - `classifier`: Frequency grouping and tie-aware ranking.
//! - `config`: Configuration management.
//! - `enrichment`: Identifier normalization and record extraction.
//! - `errors`: Error handling types.
//! - `models`: Registry response and output record models.
//! - `pipeline`: Sequential, throttled enrichment driver.
//! - `services`: Registry client.
//! - `tabular`: Delimited file input and output.
//! - `throttle`: Fixed-interval rate limiter with injectable clock.

pub mod classifier;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod tabular;
pub mod throttle;
