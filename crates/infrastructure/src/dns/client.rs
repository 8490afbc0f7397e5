use super::forwarding::{MessageBuilder, ResponseParser};
use super::transport::{create_transport, Transport};
use dnsq_domain::{Context, DomainError, ExchangeError, Transport as TransportKind};
use hickory_proto::op::Message;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::time::Instant;

/// Exchange timeout used when the context carries no deadline.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(2);

/// A transport client: one connection discipline, optionally bound to a
/// local interface address.
#[derive(Debug)]
pub struct DnsClient {
    transport: Transport,
    local: Option<IpAddr>,
    timeout: Duration,
}

impl DnsClient {
    pub fn new(kind: TransportKind, local: Option<IpAddr>) -> Self {
        Self {
            transport: create_transport(kind, local),
            local,
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Bound interface address; `None` for the any-address client.
    pub fn local(&self) -> Option<IpAddr> {
        self.local
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `message` to `hostport` and waits for the reply.
    ///
    /// The context's deadline replaces the client timeout when set. Running
    /// out of time is [`ExchangeError::Timeout`]; cancelling the context is
    /// [`DomainError::Cancelled`]. The duration covers send to decoded reply.
    pub async fn exchange(
        &self,
        ctx: &Context,
        message: &Message,
        hostport: &str,
    ) -> Result<(Message, Duration), DomainError> {
        let server: SocketAddr = hostport
            .parse()
            .map_err(|_| DomainError::InvalidAddress(hostport.to_string()))?;
        let bytes = MessageBuilder::serialize_message(message)?;

        if ctx.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        let deadline = ctx
            .deadline()
            .unwrap_or_else(|| Instant::now() + self.timeout);

        let start = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(DomainError::Cancelled),
            outcome = tokio::time::timeout_at(deadline, self.transport.send(&bytes, server)) => outcome,
        };
        let response = outcome.map_err(|_| ExchangeError::Timeout {
            server: hostport.to_string(),
        })??;
        let reply = ResponseParser::parse(&response.bytes)?;

        Ok((reply, start.elapsed()))
    }
}
