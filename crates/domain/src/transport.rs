use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connection discipline used for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    #[serde(rename = "udp", alias = "datagram")]
    Datagram,
    #[serde(rename = "tcp", alias = "stream")]
    Stream,
}

impl Transport {
    pub const ALL: [Transport; 2] = [Transport::Datagram, Transport::Stream];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Datagram => "udp",
            Transport::Stream => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Datagram => write!(f, "UDP"),
            Transport::Stream => write!(f, "TCP"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" | "datagram" => Ok(Transport::Datagram),
            "tcp" | "stream" => Ok(Transport::Stream),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}
