use async_trait::async_trait;
use dnsq_domain::{Context, DomainError, QueryRequest};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one exchange: the decoded response and its round-trip time.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub message: Message,
    pub duration: Duration,
}

impl QueryResponse {
    pub fn new(message: Message, duration: Duration) -> Self {
        Self { message, duration }
    }
}

/// Executes one DNS exchange with a single nameserver.
///
/// Implementations perform at most one exchange attempt per call and never
/// retry. Cancellation of `ctx` must surface as [`DomainError::Cancelled`].
#[async_trait]
pub trait Querier: Send + Sync {
    async fn query(
        &self,
        ctx: &Context,
        request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError>;
}

#[async_trait]
impl<Q: Querier + ?Sized> Querier for Arc<Q> {
    async fn query(
        &self,
        ctx: &Context,
        request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError> {
        (**self).query(ctx, request).await
    }
}
