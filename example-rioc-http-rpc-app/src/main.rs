use clap::Parser;
use example_rioc_http_rpc_app::{Cli, DemoError, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with_target(false)
        .init();

    run(&cli).await
}
