use super::{bind_address, DnsTransport, TransportResponse};
use crate::dns::forwarding::ResponseParser;
use async_trait::async_trait;
use dnsq_domain::ExchangeError;
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};
use tracing::debug;

/// DNS over TCP transport (RFC 1035 §4.2.2 framing). One connection per
/// exchange.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    local: Option<IpAddr>,
}

impl TcpTransport {
    pub fn new(local: Option<IpAddr>) -> Self {
        Self { local }
    }

    pub fn local(&self) -> Option<IpAddr> {
        self.local
    }

    async fn connect(&self, server: SocketAddr) -> std::io::Result<TcpStream> {
        let socket = if server.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        if self.local.is_some() {
            socket.bind(bind_address(self.local, &server))?;
        }
        socket.connect(server).await
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<TransportResponse, ExchangeError> {
        let expected_id = ResponseParser::peek_id(message_bytes)
            .ok_or_else(|| ExchangeError::Malformed("query shorter than a header".into()))?;
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            ExchangeError::Malformed(format!(
                "query of {} bytes exceeds TCP framing",
                message_bytes.len()
            ))
        })?;

        let mut stream = self
            .connect(server)
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;

        let mut framed = Vec::with_capacity(message_bytes.len() + 2);
        framed.extend_from_slice(&length.to_be_bytes());
        framed.extend_from_slice(message_bytes);
        stream
            .write_all(&framed)
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;

        debug!(
            server = %server,
            local = ?self.local,
            bytes_sent = message_bytes.len(),
            "TCP query sent"
        );

        let reply_len = stream
            .read_u16()
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;
        let mut recv_buf = vec![0u8; reply_len as usize];
        stream
            .read_exact(&mut recv_buf)
            .await
            .map_err(|e| ExchangeError::from_io(server, &e))?;

        let reply_id = ResponseParser::peek_id(&recv_buf);
        if reply_id != Some(expected_id) {
            return Err(ExchangeError::Malformed(format!(
                "response id {:?} does not match query id {}",
                reply_id, expected_id
            )));
        }

        debug!(
            server = %server,
            bytes_received = recv_buf.len(),
            "TCP response received"
        );

        Ok(TransportResponse { bytes: recv_buf })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
