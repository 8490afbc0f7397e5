pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dnsq_domain::{ExchangeError, Transport as TransportKind};
use std::net::{IpAddr, SocketAddr};

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
}

/// Trait for sending raw DNS messages over the wire.
///
/// Implementations have no timeout of their own; callers bound the future.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<TransportResponse, ExchangeError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport, one per client.
#[derive(Debug)]
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    /// Send a DNS query via the appropriate protocol (static dispatch).
    pub async fn send(
        &self,
        message_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<TransportResponse, ExchangeError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, server).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, server).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Udp(_) => TransportKind::Datagram,
            Self::Tcp(_) => TransportKind::Stream,
        }
    }
}

/// Create the transport for `kind`, bound to `local` when given.
pub fn create_transport(kind: TransportKind, local: Option<IpAddr>) -> Transport {
    match kind {
        TransportKind::Datagram => Transport::Udp(udp::UdpTransport::new(local)),
        TransportKind::Stream => Transport::Tcp(tcp::TcpTransport::new(local)),
    }
}

/// Local socket address for talking to `server`: the bound interface when
/// given, otherwise the any-address of the server's family. Port 0 lets the
/// OS pick.
pub(crate) fn bind_address(local: Option<IpAddr>, server: &SocketAddr) -> SocketAddr {
    let ip = match local {
        Some(ip) => ip,
        None if server.is_ipv4() => IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
        None => IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}
