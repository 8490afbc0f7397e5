use crate::transport::Transport;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

/// Question classes used by the query layer (RFC 1035 values).
pub mod qclass {
    pub const IN: u16 = 1;
    pub const CH: u16 = 3;
    pub const HS: u16 = 4;
    pub const NONE: u16 = 254;
    pub const ANY: u16 = 255;
}

/// Question types most callers need.
pub mod qtype {
    pub const A: u16 = 1;
    pub const NS: u16 = 2;
    pub const CNAME: u16 = 5;
    pub const SOA: u16 = 6;
    pub const PTR: u16 = 12;
    pub const MX: u16 = 15;
    pub const TXT: u16 = 16;
    pub const AAAA: u16 = 28;
    pub const SRV: u16 = 33;
    pub const ANY: u16 = 255;
}

pub const DEFAULT_DNS_PORT: u16 = 53;

/// One exchange request: where to send it, from where, and what to ask.
///
/// `destination` stays textual so the query layer decides whether it is a
/// valid IPv4 or IPv6 literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub transport: Transport,
    pub local: IpAddr,
    pub destination: Arc<str>,
    pub port: u16,
    pub qname: Arc<str>,
    pub qclass: u16,
    pub qtype: u16,
}

impl QueryRequest {
    /// Stream transport from the IPv4 any-address to port 53, class IN, type A.
    pub fn new(destination: impl Into<Arc<str>>, qname: impl Into<Arc<str>>) -> Self {
        Self {
            transport: Transport::Stream,
            local: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            destination: destination.into(),
            port: DEFAULT_DNS_PORT,
            qname: qname.into(),
            qclass: qclass::IN,
            qtype: qtype::A,
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_local(mut self, local: IpAddr) -> Self {
        self.local = local;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_class(mut self, qclass: u16) -> Self {
        self.qclass = qclass;
        self
    }

    pub fn with_type(mut self, qtype: u16) -> Self {
        self.qtype = qtype;
        self
    }

    /// Identity of the question as sent on the wire. Two requests with the same
    /// key produce equivalent exchanges.
    pub fn coalescing_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.transport.as_str(),
            self.local,
            self.destination,
            self.port,
            fqdn(&self.qname).to_ascii_lowercase(),
            self.qclass,
            self.qtype
        )
    }

    /// Key naming the destination endpoint, shared by every question sent there.
    pub fn destination_key(&self) -> String {
        format!("{}|{}", self.destination, self.port)
    }
}

/// Appends the root label when missing.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}
