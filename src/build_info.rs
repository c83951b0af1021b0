//! Build metadata exposed by the CLI and the `/version` endpoint.

/// Crate version from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
