use super::client::DnsClient;
use dnsq_domain::{DomainError, Transport};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

type ClientSet = HashMap<Transport, Arc<DnsClient>>;

/// Transport clients keyed by local address, built once and read without
/// locking.
///
/// Every address gets one client per enabled transport. The IPv4 and IPv6
/// any-addresses share a single unbound set; every other address gets a set
/// bound to it.
#[derive(Debug)]
pub struct ClientPool {
    clients: HashMap<IpAddr, Arc<ClientSet>>,
}

impl ClientPool {
    /// Builds a pool over the host's interface addresses.
    pub fn discover() -> Result<Self, DomainError> {
        Self::builder().discover()
    }

    /// Builds a pool over `addresses` plus the any-addresses.
    pub fn from_addresses<I>(addresses: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        Self::builder().build(addresses)
    }

    /// Like [`from_addresses`](Self::from_addresses) for textual addresses.
    pub fn parse_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, DomainError> {
        Self::builder().parse(addresses)
    }

    pub fn builder() -> ClientPoolBuilder {
        ClientPoolBuilder::default()
    }

    /// Client for `transport` bound to `local`. IPv4-mapped IPv6 addresses
    /// select the IPv4 entry.
    pub fn client(
        &self,
        local: &IpAddr,
        transport: Transport,
    ) -> Result<&Arc<DnsClient>, DomainError> {
        let set = self
            .clients
            .get(&local.to_canonical())
            .ok_or(DomainError::InvalidLocalAddress(*local))?;
        set.get(&transport)
            .ok_or(DomainError::InvalidProtocol(transport))
    }

    /// Pool keys in ascending order.
    pub fn local_addresses(&self) -> Vec<IpAddr> {
        let mut addresses: Vec<IpAddr> = self.clients.keys().copied().collect();
        addresses.sort();
        addresses
    }

    /// True when both keys resolve to the very same client set.
    pub fn shares_clients(&self, a: &IpAddr, b: &IpAddr) -> bool {
        match (
            self.clients.get(&a.to_canonical()),
            self.clients.get(&b.to_canonical()),
        ) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Chooses transports and client timeout before a pool is built.
#[derive(Debug, Clone)]
pub struct ClientPoolBuilder {
    transports: Vec<Transport>,
    timeout: Option<Duration>,
}

impl Default for ClientPoolBuilder {
    fn default() -> Self {
        Self {
            transports: Transport::ALL.to_vec(),
            timeout: None,
        }
    }
}

impl ClientPoolBuilder {
    pub fn transports(mut self, transports: &[Transport]) -> Self {
        self.transports = transports.to_vec();
        self
    }

    /// Exchange timeout for contexts without a deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn discover(self) -> Result<ClientPool, DomainError> {
        let interfaces = local_ip_address::list_afinet_netifas()
            .map_err(|e| DomainError::InterfaceEnumeration(e.to_string()))?;

        for (name, ip) in &interfaces {
            debug!(interface = %name, address = %ip, "Discovered interface address");
        }

        Ok(self.build(interfaces.into_iter().map(|(_, ip)| ip)))
    }

    pub fn parse<S: AsRef<str>>(self, addresses: &[S]) -> Result<ClientPool, DomainError> {
        let parsed = addresses
            .iter()
            .map(|address| {
                let address = address.as_ref();
                address
                    .parse::<IpAddr>()
                    .map_err(|_| DomainError::InvalidAddress(address.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.build(parsed))
    }

    pub fn build<I>(self, addresses: I) -> ClientPool
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let mut clients = HashMap::new();

        let any = Arc::new(self.client_set(None));
        clients.insert(IpAddr::V4(Ipv4Addr::UNSPECIFIED), Arc::clone(&any));
        clients.insert(IpAddr::V6(Ipv6Addr::UNSPECIFIED), any);

        for address in addresses {
            let address = address.to_canonical();
            if address.is_unspecified() {
                continue;
            }
            clients
                .entry(address)
                .or_insert_with(|| Arc::new(self.client_set(Some(address))));
        }

        info!(
            addresses = clients.len(),
            transports = ?self.transports,
            "Client pool built"
        );

        ClientPool { clients }
    }

    fn client_set(&self, local: Option<IpAddr>) -> ClientSet {
        self.transports
            .iter()
            .map(|&transport| {
                let mut client = DnsClient::new(transport, local);
                if let Some(timeout) = self.timeout {
                    client = client.with_timeout(timeout);
                }
                (transport, Arc::new(client))
            })
            .collect()
    }
}
