#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// Address every mock answer carries.
pub const MOCK_ANSWER: [u8; 4] = [93, 184, 216, 34];

/// How the mock server treats incoming queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Reply with one A record.
    Answer,
    /// Read queries and never reply.
    Silent,
    /// Reply once with a wrong transaction id, then answer properly.
    WrongIdFirst,
}

/// Mock DNS server on loopback, answering over UDP or TCP.
///
/// Listens on an OS-assigned port and stops when dropped.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn udp(behavior: MockBehavior) -> std::io::Result<Self> {
        Self::udp_on("127.0.0.1:0".parse().unwrap(), behavior).await
    }

    pub async fn udp_on(addr: SocketAddr, behavior: MockBehavior) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = &buf[..len];
                        match behavior {
                            MockBehavior::Silent => {}
                            MockBehavior::Answer => {
                                let _ = socket.send_to(&build_mock_response(query), peer).await;
                            }
                            MockBehavior::WrongIdFirst => {
                                let mut wrong = build_mock_response(query);
                                if wrong.len() >= 2 {
                                    wrong[0] ^= 0xff;
                                }
                                let _ = socket.send_to(&wrong, peer).await;
                                let _ = socket.send_to(&build_mock_response(query), peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr: local_addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub async fn tcp(behavior: MockBehavior) -> std::io::Result<Self> {
        Self::tcp_on("127.0.0.1:0".parse().unwrap(), behavior).await
    }

    pub async fn tcp_on(addr: SocketAddr, behavior: MockBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let counter = Arc::clone(&counter);
                        tokio::spawn(serve_tcp(stream, behavior, counter));
                    }
                }
            }
        });

        Ok(Self {
            addr: local_addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queries received so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_tcp(mut stream: TcpStream, behavior: MockBehavior, counter: Arc<AtomicUsize>) {
    loop {
        let Ok(len) = stream.read_u16().await else { return };
        let mut query = vec![0u8; len as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }
        counter.fetch_add(1, Ordering::SeqCst);

        let response = match behavior {
            MockBehavior::Silent => {
                // Hold the connection open without answering.
                let mut sink = [0u8; 1];
                let _ = stream.read(&mut sink).await;
                return;
            }
            MockBehavior::Answer => build_mock_response(&query),
            MockBehavior::WrongIdFirst => {
                let mut wrong = build_mock_response(&query);
                wrong[0] ^= 0xff;
                wrong
            }
        };

        let mut framed = (response.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&response);
        if stream.write_all(&framed).await.is_err() {
            return;
        }
    }
}

/// Echoes the query's header and question and appends one A answer.
pub fn build_mock_response(query: &[u8]) -> Vec<u8> {
    if query.len() < 12 {
        return vec![];
    }

    let mut response = Vec::with_capacity(512);

    // Transaction ID
    response.extend_from_slice(&query[0..2]);

    // Flags: QR=1, RD=1, RA=1
    response.push(0x81);
    response.push(0x80);

    // Questions count (from query)
    response.extend_from_slice(&query[4..6]);

    // Answers: 1, Authority: 0, Additional: 0
    response.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);

    // Question section
    response.extend_from_slice(&query[12..]);

    // Answer section (A record pointing back at the question name)
    response.extend_from_slice(&[
        0xc0, 0x0c, // Name pointer to question
        0x00, 0x01, // Type A
        0x00, 0x01, // Class IN
        0x00, 0x00, 0x00, 0x3c, // TTL: 60 seconds
        0x00, 0x04, // Data length: 4 bytes
    ]);
    response.extend_from_slice(&MOCK_ANSWER);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_builder() {
        let query = vec![
            0xab, 0xcd, // ID
            0x01, 0x00, // Flags
            0x00, 0x01, // Questions
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Counts
        ];

        let response = build_mock_response(&query);

        assert!(response.len() > 12);
        assert_eq!(response[0..2], [0xab, 0xcd]);
        assert_eq!(response[2], 0x81);
    }
}
