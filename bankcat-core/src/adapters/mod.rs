//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the Categorizer port

pub mod http;

#[cfg(test)]
pub mod categorizer_mock;
