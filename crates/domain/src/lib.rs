//! dnsq Domain Layer
pub mod config;
pub mod context;
pub mod dns_query;
pub mod errors;
pub mod transport;

pub use config::{CliOverrides, Config, ConfigError};
pub use context::{Context, DoneReason};
pub use dns_query::{fqdn, qclass, qtype, QueryRequest, DEFAULT_DNS_PORT};
pub use errors::{DomainError, ExchangeError, InvariantViolation};
pub use transport::Transport;
