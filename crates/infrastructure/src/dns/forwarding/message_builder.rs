//! DNS Message Builder
//!
//! Constructs DNS query messages using `hickory-proto` and serializes them to
//! wire format.

use super::record_type_map::QuestionMapper;
use dnsq_domain::{fqdn, DomainError, ExchangeError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query message with a random transaction id and exactly one
    /// question.
    ///
    /// # Arguments
    /// * `qname` - Name to query; the root label is appended when missing
    /// * `qclass` - Question class (e.g., 1 for IN)
    /// * `qtype` - Question type (e.g., 1 for A, 28 for AAAA)
    pub fn build_query(qname: &str, qclass: u16, qtype: u16) -> Result<Message, DomainError> {
        let name = Name::from_str(&fqdn(qname)).map_err(|e| {
            DomainError::InvalidQuestion(format!("Invalid domain '{}': {}", qname, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(QuestionMapper::record_type(qtype));
        query.set_query_class(QuestionMapper::class(qclass)?);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        Ok(message)
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, ExchangeError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            ExchangeError::Malformed(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
