use crate::sync::{DistributionReceiver, Distributor, KeyedSemaphoreRegistry};
use async_trait::async_trait;
use dnsq_application::ports::{Querier, QueryResponse};
use dnsq_domain::{Context, DomainError, QueryRequest};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

type SharedOutcome = Result<QueryResponse, DomainError>;
type InFlight = Mutex<HashMap<String, DistributionReceiver<SharedOutcome>>>;

/// Shares one exchange between identical concurrent queries and bounds the
/// exchanges in flight per destination.
///
/// The first caller for a question leads: it procures a slot for the
/// destination, runs the inner querier and publishes the outcome. Callers
/// arriving while it runs receive a copy of that outcome. A leader whose own
/// context ends, by cancellation or by its deadline expiring mid-exchange,
/// publishes nothing; its followers start over under their own contexts and
/// one of them leads instead.
pub struct CoalescingQuerier<Q> {
    inner: Q,
    limiter: KeyedSemaphoreRegistry,
    in_flight: InFlight,
}

enum Role<'a> {
    Leader(Flight<'a>),
    Follower(DistributionReceiver<SharedOutcome>),
}

/// A leader's claim on a question. Dropping it withdraws the question from
/// the in-flight table before the distributor goes away.
struct Flight<'a> {
    in_flight: &'a InFlight,
    key: String,
    distributor: Distributor<SharedOutcome>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<Q: Querier> CoalescingQuerier<Q> {
    /// `per_destination` caps concurrent exchanges to one destination
    /// endpoint.
    pub fn new(inner: Q, per_destination: u16) -> Self {
        Self {
            inner,
            limiter: KeyedSemaphoreRegistry::new(per_destination),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    pub fn limiter(&self) -> &KeyedSemaphoreRegistry {
        &self.limiter
    }

    /// Questions currently led by some caller.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn join_or_lead(&self, key: &str) -> Role<'_> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(receiver) = in_flight.get(key) {
            return Role::Follower(receiver.clone());
        }
        let distributor = Distributor::new();
        in_flight.insert(key.to_string(), distributor.subscribe());
        Role::Leader(Flight {
            in_flight: &self.in_flight,
            key: key.to_string(),
            distributor,
        })
    }

    async fn lead(
        &self,
        ctx: &Context,
        request: &QueryRequest,
        flight: Flight<'_>,
    ) -> SharedOutcome {
        let destination = request.destination_key();
        let outcome: SharedOutcome = async {
            let _permit = self.limiter.procure_permit(ctx, &destination).await?;
            self.inner.query(ctx, request).await
        }
        .await;

        if !withdrawn(ctx, &outcome) {
            flight.distributor.distribute(outcome.clone())?;
        }
        drop(flight);
        outcome
    }
}

/// True when the outcome reflects the leader's own context rather than the
/// question.
fn withdrawn(ctx: &Context, outcome: &SharedOutcome) -> bool {
    match outcome {
        Err(DomainError::Cancelled) => true,
        Err(DomainError::Exchange(e)) if e.is_timeout() => ctx.is_done(),
        _ => false,
    }
}

#[async_trait]
impl<Q: Querier> Querier for CoalescingQuerier<Q> {
    async fn query(
        &self,
        ctx: &Context,
        request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError> {
        let key = request.coalescing_key();
        loop {
            if ctx.is_done() {
                return Err(DomainError::Cancelled);
            }
            let receiver = match self.join_or_lead(&key) {
                Role::Leader(flight) => return self.lead(ctx, request, flight).await,
                Role::Follower(receiver) => receiver,
            };

            debug!(key = %key, "Joined in-flight query");

            let shared = tokio::select! {
                biased;
                _ = ctx.done() => return Err(DomainError::Cancelled),
                shared = receiver.receive() => shared,
            };
            match shared {
                Ok(outcome) => return outcome,
                Err(DomainError::DistributorClosed) => {
                    debug!(key = %key, "Leader withdrew, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
