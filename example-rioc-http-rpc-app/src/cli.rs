use clap::{Parser, ValueEnum};
use rioc_tokio_rpc_client::{ClientConfig, LowestLatency, RandomChoice, RoundRobin};

/// Starts MathServer backends on random local ports and calls them through
/// one load-balanced client.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Number of backend processes to start.
    #[arg(short, long, default_value_t = 3)]
    pub servers: usize,

    /// Route prefix every backend serves under.
    #[arg(long, default_value = "/rpc")]
    pub route_prefix: String,

    /// Log full request and response payloads.
    #[arg(short, long)]
    pub debug: bool,

    #[arg(long, value_enum, default_value_t = Balancer::RoundRobin)]
    pub balancer: Balancer,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balancer {
    RoundRobin,
    Latency,
    Random,
}

impl Cli {
    /// Default log directive; `RUST_LOG` still wins when set.
    pub fn log_directive(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    /// Client settings for the given backend addresses.
    pub fn client_config(&self, addresses: &[String]) -> ClientConfig {
        let config = addresses
            .iter()
            .fold(ClientConfig::new(), |config, address| {
                config.with_backend(address.clone(), self.route_prefix.clone())
            })
            .with_debug(self.debug);

        match self.balancer {
            Balancer::RoundRobin => config.with_load_balancer(RoundRobin::new),
            Balancer::Latency => config.with_load_balancer(|| LowestLatency),
            Balancer::Random => config.with_load_balancer(|| RandomChoice),
        }
    }
}
