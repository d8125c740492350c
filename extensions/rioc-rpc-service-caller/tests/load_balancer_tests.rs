use rioc_rpc_service_caller::{
    ClientConfig, EndpointHandle, LoadBalancer, LowestLatency, RandomChoice, RoundRobin,
};
use std::sync::Arc;
use std::time::Duration;

fn endpoints(latencies_ms: &[u64]) -> Vec<Arc<EndpointHandle>> {
    latencies_ms
        .iter()
        .enumerate()
        .map(|(index, ms)| {
            Arc::new(EndpointHandle::new(
                format!("127.0.0.1:{}", 9000 + index),
                "",
                Duration::from_millis(*ms),
            ))
        })
        .collect()
}

#[test]
fn test_round_robin_cycles_in_order() {
    let balancer = RoundRobin::new();
    let endpoints = endpoints(&[0, 0, 0]);

    let picks: Vec<usize> = (0..7).map(|_| balancer.select(&endpoints)).collect();
    assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
}

#[test]
fn test_round_robin_is_shared_across_threads() {
    let balancer = Arc::new(RoundRobin::new());
    let endpoints = Arc::new(endpoints(&[0, 0, 0, 0]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let balancer = balancer.clone();
            let endpoints = endpoints.clone();
            std::thread::spawn(move || {
                (0..100)
                    .map(|_| balancer.select(&endpoints))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut counts = [0usize; 4];
    for handle in handles {
        for index in handle.join().unwrap() {
            counts[index] += 1;
        }
    }
    // 400 selections over 4 endpoints split evenly.
    assert_eq!(counts, [100, 100, 100, 100]);
}

#[test]
fn test_lowest_latency_prefers_fastest_and_first_on_tie() {
    let endpoints = endpoints(&[30, 10, 20, 10]);
    assert_eq!(LowestLatency.select(&endpoints), 1);

    endpoints[1].record_latency(Duration::from_millis(50));
    assert_eq!(LowestLatency.select(&endpoints), 3);
    assert_eq!(endpoints[1].last_observed_latency(), Duration::from_millis(50));
}

#[test]
fn test_random_choice_stays_in_bounds() {
    let endpoints = endpoints(&[0, 0, 0]);
    for _ in 0..200 {
        assert!(RandomChoice.select(&endpoints) < endpoints.len());
    }
}

#[test]
fn test_closure_is_a_load_balancer() {
    let always_last = |endpoints: &[Arc<EndpointHandle>]| endpoints.len() - 1;
    let endpoints = endpoints(&[0, 0, 0]);
    assert_eq!(always_last.select(&endpoints), 2);
}

#[test]
fn test_configured_policy_is_fresh_per_service() {
    let config = ClientConfig::new().with_load_balancer(RoundRobin::new);
    let endpoints = endpoints(&[0, 0, 0]);

    let first = config.load_balancer_for_service();
    let second = config.load_balancer_for_service();
    assert_eq!(first.select(&endpoints), 0);
    assert_eq!(first.select(&endpoints), 1);
    assert_eq!(second.select(&endpoints), 0);

    let fallback = ClientConfig::new().load_balancer_for_service();
    assert_eq!(fallback.select(&endpoints), 0);
    assert_eq!(fallback.select(&endpoints), 1);
}
