use dnsq_application::ports::Querier;
use dnsq_application::use_cases::ResolveHostUseCase;
use dnsq_domain::Config;
use dnsq_infrastructure::dns::{ClientPool, CoalescingQuerier, NetworkQuerier};
use std::sync::Arc;
use tracing::info;

/// Query stack built once per process from the loaded configuration.
pub struct DnsServices {
    pub pool: Arc<ClientPool>,
    pub querier: Arc<dyn Querier>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = Arc::new(
            ClientPool::builder()
                .timeout(config.querier.query_timeout())
                .discover()?,
        );
        let network = NetworkQuerier::new(Arc::clone(&pool));
        let querier: Arc<dyn Querier> = Arc::new(CoalescingQuerier::new(
            network,
            config.querier.per_key_capacity,
        ));

        info!(
            local_addresses = pool.len(),
            per_key_capacity = config.querier.per_key_capacity,
            "DNS services initialized"
        );

        Ok(Self { pool, querier })
    }

    pub fn resolve_host(&self, config: &Config) -> anyhow::Result<ResolveHostUseCase> {
        Ok(ResolveHostUseCase::from_config(
            Arc::clone(&self.querier),
            &config.resolver,
        )?)
    }
}
