use dnsq_domain::{qclass, DomainError};
use hickory_proto::rr::{DNSClass, RecordType as HickoryRecordType};

/// Maps question numbers to their hickory representation.
pub struct QuestionMapper;

impl QuestionMapper {
    /// Any type number is representable; unknown ones stay numeric.
    pub fn record_type(qtype: u16) -> HickoryRecordType {
        HickoryRecordType::from(qtype)
    }

    /// Only the classes defined for queries are accepted.
    pub fn class(value: u16) -> Result<DNSClass, DomainError> {
        match value {
            qclass::IN => Ok(DNSClass::IN),
            qclass::CH => Ok(DNSClass::CH),
            qclass::HS => Ok(DNSClass::HS),
            qclass::NONE => Ok(DNSClass::NONE),
            qclass::ANY => Ok(DNSClass::ANY),
            other => Err(DomainError::InvalidQuestion(format!(
                "Unsupported query class {}",
                other
            ))),
        }
    }
}
