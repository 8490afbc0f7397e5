use crate::transport::Transport;
use serde::{Deserialize, Serialize};

/// Nameserver used for host lookups
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Nameserver address literal (default: "127.0.0.1")
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// "tcp" or "udp" (default: "tcp")
    #[serde(default = "default_transport")]
    pub transport: Transport,

    /// Local bind address; must be an interface address or an any-address
    /// (default: "0.0.0.0")
    #[serde(default = "default_local_address")]
    pub local_address: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            transport: default_transport(),
            local_address: default_local_address(),
        }
    }
}

fn default_server() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_transport() -> Transport {
    Transport::Stream
}

fn default_local_address() -> String {
    "0.0.0.0".to_string()
}
