//! CLI command implementations.

pub mod credentials;
pub mod plan;
pub mod profiles;
