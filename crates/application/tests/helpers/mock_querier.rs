use async_trait::async_trait;
use dnsq_application::ports::{Querier, QueryResponse};
use dnsq_domain::{Context, DomainError, QueryRequest};
use hickory_proto::op::Message;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One answer record in a canned response.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    Addr(IpAddr),
    Txt(&'static str),
}

/// Querier answering every request with the configured records.
#[derive(Clone)]
pub struct MockQuerier {
    answers: Arc<RwLock<Vec<MockAnswer>>>,
    failure: Arc<RwLock<Option<DomainError>>>,
    requests: Arc<RwLock<Vec<QueryRequest>>>,
}

impl MockQuerier {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_answers(&self, answers: Vec<MockAnswer>) {
        *self.answers.write().await = answers;
    }

    pub async fn set_failure(&self, error: DomainError) {
        *self.failure.write().await = Some(error);
    }

    pub async fn requests(&self) -> Vec<QueryRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Querier for MockQuerier {
    async fn query(
        &self,
        _ctx: &Context,
        request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError> {
        self.requests.write().await.push(request.clone());

        if let Some(error) = self.failure.read().await.clone() {
            return Err(error);
        }

        let answers = self.answers.read().await.clone();
        let bytes = response_bytes(0x1234, &request.qname, request.qtype, &answers);
        let message = Message::from_vec(&bytes).expect("mock response must decode");
        Ok(QueryResponse::new(message, Duration::from_millis(3)))
    }
}

/// Wire-format response with one question and the given answers, each
/// answer owned by the question name through a compression pointer.
pub fn response_bytes(id: u16, qname: &str, qtype: u16, answers: &[MockAnswer]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(512);

    bytes.extend_from_slice(&id.to_be_bytes());
    bytes.push(0x81); // QR=1, RD=1
    bytes.push(0x80); // RA=1, RCODE=0
    bytes.extend_from_slice(&1u16.to_be_bytes());
    bytes.extend_from_slice(&(answers.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    for label in qname.trim_end_matches('.').split('.') {
        bytes.push(label.len() as u8);
        bytes.extend_from_slice(label.as_bytes());
    }
    bytes.push(0);
    bytes.extend_from_slice(&qtype.to_be_bytes());
    bytes.extend_from_slice(&1u16.to_be_bytes());

    for answer in answers {
        bytes.extend_from_slice(&[0xc0, 0x0c]);
        let (rtype, rdata): (u16, Vec<u8>) = match answer {
            MockAnswer::Addr(IpAddr::V4(v4)) => (1, v4.octets().to_vec()),
            MockAnswer::Addr(IpAddr::V6(v6)) => (28, v6.octets().to_vec()),
            MockAnswer::Txt(text) => {
                let mut rdata = vec![text.len() as u8];
                rdata.extend_from_slice(text.as_bytes());
                (16, rdata)
            }
        };
        bytes.extend_from_slice(&rtype.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&60u32.to_be_bytes());
        bytes.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&rdata);
    }

    bytes
}
