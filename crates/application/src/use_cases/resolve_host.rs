use crate::ports::Querier;
use dnsq_domain::config::ResolverConfig;
use dnsq_domain::{
    qclass, qtype, Context, DomainError, QueryRequest, Transport, DEFAULT_DNS_PORT,
};
use hickory_proto::op::Message;
use hickory_proto::rr::RData;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Addresses a host name resolved to, in answer order.
#[derive(Debug, Clone)]
pub struct HostResolution {
    pub host: Arc<str>,
    pub addresses: Vec<IpAddr>,
    pub duration: Duration,
}

/// Dialer-level lookup: one question to one nameserver, answers reduced to
/// IP addresses.
pub struct ResolveHostUseCase {
    querier: Arc<dyn Querier>,
    server: Arc<str>,
    port: u16,
    transport: Transport,
    local: IpAddr,
}

impl ResolveHostUseCase {
    /// Stream transport from the IPv4 any-address to the loopback resolver.
    pub fn new(querier: Arc<dyn Querier>) -> Self {
        Self {
            querier,
            server: Arc::from("127.0.0.1"),
            port: DEFAULT_DNS_PORT,
            transport: Transport::Stream,
            local: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    pub fn from_config(
        querier: Arc<dyn Querier>,
        config: &ResolverConfig,
    ) -> Result<Self, DomainError> {
        let local = config
            .local_address
            .parse()
            .map_err(|_| DomainError::InvalidAddress(config.local_address.clone()))?;
        Ok(Self::new(querier)
            .with_server(config.server.as_str(), config.port)
            .with_transport(config.transport)
            .with_local(local))
    }

    pub fn with_server(mut self, server: impl Into<Arc<str>>, port: u16) -> Self {
        self.server = server.into();
        self.port = port;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_local(mut self, local: IpAddr) -> Self {
        self.local = local;
        self
    }

    /// Resolves `host` with an A question.
    pub async fn execute(&self, ctx: &Context, host: &str) -> Result<HostResolution, DomainError> {
        self.execute_with_type(ctx, host, qtype::A).await
    }

    /// Resolves `host` with the given question type. A response without any
    /// A or AAAA answer is [`DomainError::EmptyAnswer`].
    pub async fn execute_with_type(
        &self,
        ctx: &Context,
        host: &str,
        record_type: u16,
    ) -> Result<HostResolution, DomainError> {
        let request = QueryRequest::new(Arc::clone(&self.server), host)
            .with_transport(self.transport)
            .with_local(self.local)
            .with_port(self.port)
            .with_class(qclass::IN)
            .with_type(record_type);

        let response = self.querier.query(ctx, &request).await?;
        let addresses = answer_addresses(&response.message);
        if addresses.is_empty() {
            return Err(DomainError::EmptyAnswer(host.to_string()));
        }

        debug!(
            host = %host,
            addresses = addresses.len(),
            rtt_us = response.duration.as_micros() as u64,
            "Host resolved"
        );

        Ok(HostResolution {
            host: Arc::from(host),
            addresses,
            duration: response.duration,
        })
    }
}

/// A and AAAA answers of `message`; other record types are skipped.
pub fn answer_addresses(message: &Message) -> Vec<IpAddr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect()
}
