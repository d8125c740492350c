use crate::EndpointHandle;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks which endpoint serves the next call.
///
/// Implementations are shared by concurrent callers, so any internal state
/// must be synchronized. The returned index must be in bounds; the invoker
/// rejects anything else as a call error.
pub trait LoadBalancer: Send + Sync {
    fn select(&self, endpoints: &[Arc<EndpointHandle>]) -> usize;
}

impl<F> LoadBalancer for F
where
    F: Fn(&[Arc<EndpointHandle>]) -> usize + Send + Sync,
{
    fn select(&self, endpoints: &[Arc<EndpointHandle>]) -> usize {
        self(endpoints)
    }
}

/// Cycles through endpoints in order: 0, 1, 2, 0, 1, 2, ...
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn select(&self, endpoints: &[Arc<EndpointHandle>]) -> usize {
        let len = endpoints.len();
        if len == 0 {
            return 0;
        }
        let previous = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some((current + 1) % len)
            })
            .unwrap_or_else(|current| current);
        previous % len
    }
}

/// Picks the endpoint with the smallest last observed latency; the first one
/// wins a tie.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowestLatency;

impl LoadBalancer for LowestLatency {
    fn select(&self, endpoints: &[Arc<EndpointHandle>]) -> usize {
        endpoints
            .iter()
            .enumerate()
            .min_by_key(|(_, endpoint)| endpoint.last_observed_latency())
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}

/// Picks a uniformly random endpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChoice;

impl LoadBalancer for RandomChoice {
    fn select(&self, endpoints: &[Arc<EndpointHandle>]) -> usize {
        if endpoints.is_empty() {
            return 0;
        }
        rand::rng().random_range(0..endpoints.len())
    }
}
