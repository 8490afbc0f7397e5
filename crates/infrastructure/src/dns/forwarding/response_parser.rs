use dnsq_domain::ExchangeError;
use hickory_proto::op::Message;
use tracing::debug;

pub struct ResponseParser;

impl ResponseParser {
    /// Decodes a wire-format response.
    pub fn parse(response_bytes: &[u8]) -> Result<Message, ExchangeError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            ExchangeError::Malformed(format!("Failed to parse DNS response: {}", e))
        })?;

        debug!(
            id = message.id(),
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(message)
    }

    /// Transaction id of a wire-format message, when the header is present.
    pub fn peek_id(bytes: &[u8]) -> Option<u16> {
        match bytes {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_id() {
        assert_eq!(ResponseParser::peek_id(&[0xab, 0xcd, 0x81]), Some(0xabcd));
        assert_eq!(ResponseParser::peek_id(&[0xab]), None);
    }

    #[test]
    fn test_parse_rejects_truncated_header() {
        assert!(matches!(
            ResponseParser::parse(&[0x00, 0x01, 0x81]),
            Err(ExchangeError::Malformed(_))
        ));
    }
}
