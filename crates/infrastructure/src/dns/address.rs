use dnsq_domain::DomainError;
use std::net::IpAddr;

fn parse(address: &str) -> Option<IpAddr> {
    address.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

/// True for IPv4 literals, including IPv4-mapped IPv6 ones.
pub fn is_ipv4(address: &str) -> bool {
    matches!(parse(address), Some(IpAddr::V4(_)))
}

pub fn is_ipv6(address: &str) -> bool {
    matches!(parse(address), Some(IpAddr::V6(_)))
}

/// Canonical text of an IP literal.
pub fn construct_address(address: &str) -> Result<String, DomainError> {
    parse(address)
        .map(|ip| ip.to_string())
        .ok_or_else(|| DomainError::InvalidAddress(address.to_string()))
}

/// `addr:port` for IPv4, `[addr]:port` for IPv6.
pub fn construct_hostport(address: &str, port: u16) -> Result<String, DomainError> {
    match parse(address) {
        Some(IpAddr::V6(ip)) => Ok(format!("[{}]:{}", ip, port)),
        Some(IpAddr::V4(ip)) => Ok(format!("{}:{}", ip, port)),
        None => Err(DomainError::InvalidAddress(address.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostport_ipv4_unbracketed() {
        assert_eq!(construct_hostport("192.0.2.1", 53).unwrap(), "192.0.2.1:53");
    }

    #[test]
    fn test_hostport_ipv6_bracketed() {
        assert_eq!(
            construct_hostport("2001:db8::1", 53).unwrap(),
            "[2001:db8::1]:53"
        );
    }

    #[test]
    fn test_hostport_rejects_names() {
        assert_eq!(
            construct_hostport("not-an-ip", 53),
            Err(DomainError::InvalidAddress("not-an-ip".to_string()))
        );
        assert!(construct_hostport("", 53).is_err());
    }

    #[test]
    fn test_mapped_ipv4_is_ipv4() {
        assert!(is_ipv4("::ffff:192.0.2.1"));
        assert!(!is_ipv6("::ffff:192.0.2.1"));
        assert_eq!(
            construct_hostport("::ffff:192.0.2.1", 53).unwrap(),
            "192.0.2.1:53"
        );
    }

    #[test]
    fn test_construct_address_canonicalizes() {
        assert_eq!(construct_address("2001:0db8::0001").unwrap(), "2001:db8::1");
        assert!(construct_address("example.com").is_err());
    }

    #[test]
    fn test_family_checks() {
        assert!(is_ipv4("127.0.0.1"));
        assert!(!is_ipv6("127.0.0.1"));
        assert!(is_ipv6("::1"));
        assert!(!is_ipv4("::1"));
        assert!(!is_ipv4("localhost"));
        assert!(!is_ipv6("localhost"));
    }
}
