//! ripplecheck — cross-file impact aware AI merge request reviewer
//! (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod gitlab;
pub mod impact;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod publish;
pub mod recovery;
pub mod resolve;
pub mod review;
pub mod symbols;
