use super::address::construct_hostport;
use super::client_pool::ClientPool;
use super::forwarding::MessageBuilder;
use async_trait::async_trait;
use dnsq_application::ports::{Querier, QueryResponse};
use dnsq_domain::{Context, DomainError, QueryRequest};
use std::sync::Arc;
use tracing::debug;

/// Executes each query as exactly one network exchange through a client
/// taken from the pool.
#[derive(Debug, Clone)]
pub struct NetworkQuerier {
    pool: Arc<ClientPool>,
}

impl NetworkQuerier {
    pub fn new(pool: Arc<ClientPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<ClientPool> {
        &self.pool
    }
}

#[async_trait]
impl Querier for NetworkQuerier {
    async fn query(
        &self,
        ctx: &Context,
        request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError> {
        let client = self.pool.client(&request.local, request.transport)?;
        let hostport = construct_hostport(&request.destination, request.port)?;
        let message = MessageBuilder::build_query(&request.qname, request.qclass, request.qtype)?;

        debug!(
            server = %hostport,
            transport = %request.transport,
            local = %request.local,
            id = message.id(),
            qname = %request.qname,
            qtype = request.qtype,
            "Sending query"
        );

        let (response, duration) = client.exchange(ctx, &message, &hostport).await?;

        debug!(
            server = %hostport,
            id = response.id(),
            answers = response.answers().len(),
            rtt_ms = duration.as_millis() as u64,
            "Query answered"
        );

        Ok(QueryResponse::new(response, duration))
    }
}
