//! Configuration module for dnsq
//!
//! - `root`: Main configuration and CLI overrides
//! - `querier`: Per-key capacity and query timeout
//! - `resolver`: Where host lookups are sent
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod querier;
pub mod resolver;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use querier::QuerierConfig;
pub use resolver::ResolverConfig;
pub use root::{CliOverrides, Config};
