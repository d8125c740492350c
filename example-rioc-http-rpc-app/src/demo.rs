use crate::Cli;
use example_rioc_rpc_service_definition::{MathServer, MathServerProxy, Obj, Sub};
use rioc_tokio_rpc_client::{ClientInitError, Context, RemoteProxy, RpcCallerError, RpcClient};
use rioc_tokio_rpc_server::{
    RpcServer, RpcServerError, ServerConfig,
    utils::{bind_tcp_listener_on_random_port, tcp_listener_to_backend_address},
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Server(#[from] RpcServerError),

    #[error(transparent)]
    Connect(#[from] ClientInitError),

    #[error(transparent)]
    Call(#[from] RpcCallerError),
}

/// Starts `count` MathServer backends on random local ports.
///
/// Returns their `host:port` addresses once every server task is spawned.
pub async fn spawn_math_backends(
    count: usize,
    route_prefix: &str,
) -> Result<Vec<String>, DemoError> {
    let mut addresses = Vec::with_capacity(count);
    for _ in 0..count {
        let (listener, _port) = bind_tcp_listener_on_random_port().await?;
        let address = tcp_listener_to_backend_address(&listener)?;

        let config = ServerConfig::new(&address).with_route_prefix(route_prefix);
        let server = Arc::new(RpcServer::new(config)?);
        server.register(MathServer::new()).await?;

        tokio::spawn(async move {
            if let Err(err) = server.serve_with_listener(listener).await {
                tracing::error!("Backend stopped: {err}");
            }
        });
        addresses.push(address);
    }
    Ok(addresses)
}

/// Connects a client to every backend and runs a handful of calls.
pub async fn run(cli: &Cli) -> Result<(), DemoError> {
    let addresses = spawn_math_backends(cli.servers, &cli.route_prefix).await?;

    // Wait briefly for the servers to start accepting.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let math = Arc::new(MathServerProxy::new());
    let proxies: Vec<Arc<dyn RemoteProxy>> = vec![math.clone()];
    let client = RpcClient::connect(cli.client_config(&addresses), &proxies).await?;

    let (sum_i, sum_s, sum_iv) = tokio::join!(
        math.sum_i(1, 2),
        math.sum_s("hello, ", "world"),
        math.sum_slice_iv(1, &[2, 3, 4]),
    );
    tracing::info!("SumI(1, 2) = {}", sum_i?);
    tracing::info!("SumS(\"hello, \", \"world\") = {:?}", sum_s?);
    tracing::info!("SumSliceIV(1, 2, 3, 4) = {}", sum_iv?);

    let obj = Obj {
        int: 1,
        string: "a".to_string(),
        subs: vec![Some(Sub { float: 0.5 })],
    };
    tracing::info!("SumObj = {:?}", math.sum_obj(obj.clone(), obj).await?);
    tracing::info!("WithContext = {}", math.with_context(Context::background()).await?);

    match math.convert_error("something broke").await {
        Err(RpcCallerError::Application { error, .. }) => {
            tracing::info!("ConvertError returned remote error: {error}")
        }
        other => tracing::warn!("ConvertError returned {other:?}"),
    }

    for (address, healthy) in client.health().await {
        tracing::info!(address = %address, healthy = ?healthy, "Backend health");
    }
    Ok(())
}
