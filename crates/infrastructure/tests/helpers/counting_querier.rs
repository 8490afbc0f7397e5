#![allow(dead_code)]
use async_trait::async_trait;
use dnsq_application::ports::{Querier, QueryResponse};
use dnsq_domain::{Context, DomainError, DoneReason, ExchangeError, QueryRequest};
use hickory_proto::op::{Message, MessageType, OpCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Querier that takes `delay` per call, counts calls and tracks how many run
/// at once. While sleeping, cancellation yields `Cancelled` and an expired
/// deadline yields an exchange timeout.
#[derive(Clone)]
pub struct CountingQuerier {
    delay: Duration,
    calls: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<DomainError>>>,
}

impl CountingQuerier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing(delay: Duration, error: DomainError) -> Self {
        let querier = Self::new(delay);
        *querier.failure.lock().unwrap() = Some(error);
        querier
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running concurrently.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct Running<'a>(&'a AtomicUsize);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Querier for CountingQuerier {
    async fn query(
        &self,
        ctx: &Context,
        _request: &QueryRequest,
    ) -> Result<QueryResponse, DomainError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _running = Running(&self.running);

        tokio::select! {
            reason = ctx.done() => {
                return Err(match reason {
                    DoneReason::Cancelled => DomainError::Cancelled,
                    DoneReason::DeadlineExceeded => DomainError::Exchange(ExchangeError::Timeout {
                        server: "127.0.0.1:53".to_string(),
                    }),
                });
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let message = Message::new(call as u16, MessageType::Response, OpCode::Query);
        Ok(QueryResponse::new(message, self.delay))
    }
}
