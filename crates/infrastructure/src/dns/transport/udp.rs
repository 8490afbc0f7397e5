use super::{bind_address, DnsTransport, TransportResponse};
use crate::dns::forwarding::ResponseParser;
use async_trait::async_trait;
use dnsq_domain::ExchangeError;
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport. One socket per exchange.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    local: Option<IpAddr>,
}

impl UdpTransport {
    pub fn new(local: Option<IpAddr>) -> Self {
        Self { local }
    }

    pub fn local(&self) -> Option<IpAddr> {
        self.local
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<TransportResponse, ExchangeError> {
        let expected_id = ResponseParser::peek_id(message_bytes)
            .ok_or_else(|| ExchangeError::Malformed("query shorter than a header".into()))?;

        let socket = UdpSocket::bind(bind_address(self.local, &server))
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;

        let bytes_sent = socket
            .send_to(message_bytes, server)
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;

        debug!(
            server = %server,
            local = ?self.local,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        loop {
            let (bytes_received, from_addr) = socket
                .recv_from(&mut recv_buf)
                .await
                .map_err(|e| ExchangeError::from_io(server, &e))?;

            if from_addr != server {
                warn!(
                    expected = %server,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            let reply_id = ResponseParser::peek_id(&recv_buf[..bytes_received]);
            if reply_id != Some(expected_id) {
                warn!(
                    server = %server,
                    expected_id = expected_id,
                    received_id = ?reply_id,
                    "UDP response with mismatched id"
                );
                continue;
            }

            recv_buf.truncate(bytes_received);

            debug!(
                server = %server,
                bytes_received = bytes_received,
                "UDP response received"
            );

            return Ok(TransportResponse { bytes: recv_buf });
        }
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
