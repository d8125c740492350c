use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// One backend serving one service, plus the latency of its most recent call.
///
/// Shared between every concurrent caller of the service; the latency is an
/// atomic so load balancers can read it while calls complete.
#[derive(Debug)]
pub struct EndpointHandle {
    address: String,
    route_prefix: String,
    latency_nanos: AtomicU64,
}

impl EndpointHandle {
    pub fn new(address: impl Into<String>, route_prefix: impl Into<String>, latency: Duration) -> Self {
        Self {
            address: address.into(),
            route_prefix: route_prefix.into(),
            latency_nanos: AtomicU64::new(duration_to_nanos(latency)),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn last_observed_latency(&self) -> Duration {
        Duration::from_nanos(self.latency_nanos.load(Ordering::Relaxed))
    }

    pub fn record_latency(&self, latency: Duration) {
        self.latency_nanos
            .store(duration_to_nanos(latency), Ordering::Relaxed);
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
