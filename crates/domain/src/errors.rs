use crate::transport::Transport;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid local address: {0}")]
    InvalidLocalAddress(IpAddr),

    #[error("Invalid protocol: {0}")]
    InvalidProtocol(Transport),

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Exceeded maximum waiting procurements for key '{key}'")]
    CapacityExhausted { key: String },

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("DNS lookup for '{0}' returned zero entries")]
    EmptyAnswer(String),

    #[error("Failed to enumerate network interfaces: {0}")]
    InterfaceEnumeration(String),

    #[error("Distributor closed before a result was published")]
    DistributorClosed,
}

impl DomainError {
    /// True when the error stems from a broken procure/vacate contract. The
    /// structure that reported it refuses further use.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Invariant(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

/// Failures of a single network exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("timeout waiting for {server}")]
    Timeout { server: String },

    #[error("connection refused by {server}")]
    ConnectionRefused { server: String },

    #[error("I/O error talking to {server}: {message}")]
    Io { server: String, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ExchangeError {
    pub fn from_io(server: impl ToString, error: &std::io::Error) -> Self {
        let server = server.to_string();
        match error.kind() {
            std::io::ErrorKind::TimedOut => ExchangeError::Timeout { server },
            std::io::ErrorKind::ConnectionRefused => ExchangeError::ConnectionRefused { server },
            _ => ExchangeError::Io {
                server,
                message: error.to_string(),
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout { .. })
    }
}

/// Broken procure/vacate or publish contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("vacated unprocured semaphore")]
    VacatedUnprocured,

    #[error("invalid key '{0}'")]
    UnknownKey(String),

    #[error("released unprocured entry '{0}'")]
    ReleasedUnprocured(String),

    #[error("abandoned unprocured entry '{0}'")]
    AbandonedUnprocured(String),

    #[error("result already distributed")]
    AlreadyDistributed,

    #[error("structure is poisoned by an earlier violation")]
    Poisoned,
}
