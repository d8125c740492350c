use example_rioc_rpc_service_definition::{MATH_SERVER_ID, MathServer};
use rioc_tokio_rpc_server::{
    RpcServer, RpcServerError, ServerConfig, ServerState,
    utils::{bind_tcp_listener_on_random_port, tcp_listener_to_backend_address},
};
use serde_json::{Value as Json, json};
use std::sync::Arc;
use std::time::Duration;

/// Starts a MathServer backend on a random port and returns its base URL.
async fn spawn_math_server(route_prefix: &str) -> (Arc<RpcServer>, String) {
    let (listener, _port) = bind_tcp_listener_on_random_port().await.unwrap();
    let address = tcp_listener_to_backend_address(&listener).unwrap();

    let config = ServerConfig::new(&address).with_route_prefix(route_prefix);
    let server = Arc::new(RpcServer::new(config).unwrap());
    server.register(MathServer::new()).await.unwrap();

    tokio::spawn({
        let server = Arc::clone(&server);
        async move {
            let _ = server.serve_with_listener(listener).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    (server, format!("http://{address}{}", route_prefix.trim_end_matches('/')))
}

#[tokio::test]
async fn test_meta_and_health_routes() {
    let (server, base) = spawn_math_server("/rpc/").await;
    assert_eq!(server.state(), ServerState::Running);

    let meta: Json = reqwest::get(format!("{base}/meta"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(meta[0]["service_id"], MATH_SERVER_ID);
    let methods: Vec<&str> = meta[0]["methods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    let mut sorted = methods.clone();
    sorted.sort();
    assert_eq!(methods, sorted);

    let health: Json = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_invocation_over_http() {
    let (_server, base) = spawn_math_server("").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/component/MathServer/methods/SumI"))
        .json(&json!({ "params": [
            { "order": 2, "kind": "int", "value": 40 },
            { "order": 1, "kind": "int", "value": 2 },
        ] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Json = response.json().await.unwrap();
    assert_eq!(body, json!({ "params": [{ "order": 1, "kind": "int", "value": 42 }] }));

    let response = client
        .post(format!("{base}/component/MathServer/methods/SumI"))
        .json(&json!({ "params": [
            { "order": 1, "kind": "string", "value": "2" },
            { "order": 2, "kind": "int", "value": 40 },
        ] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Json = response.json().await.unwrap();
    assert_eq!(body["required_param_kind"], "int");
    assert_eq!(body["request_param_kind"], "string");
    assert_eq!(body["param_order"], 1);

    let response = client
        .post(format!("{base}/component/MathServer/methods/Nope"))
        .json(&json!({ "params": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_server_starts_once() {
    let (server, _base) = spawn_math_server("").await;

    assert!(matches!(
        server.register(MathServer::new()).await,
        Err(RpcServerError::AlreadyRunning)
    ));

    let (listener, _) = bind_tcp_listener_on_random_port().await.unwrap();
    assert!(matches!(
        server.serve_with_listener(listener).await,
        Err(RpcServerError::AlreadyRunning)
    ));
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    assert!(matches!(
        RpcServer::new(ServerConfig::new("127.0.0.1:0").with_route_prefix("rpc")),
        Err(RpcServerError::InvalidRoutePrefix(_))
    ));
    assert!(matches!(
        RpcServer::new(ServerConfig::new("127.0.0.1:0").with_route_prefix("/rpc/{version}")),
        Err(RpcServerError::InvalidRoutePrefix(_))
    ));
    assert!(matches!(
        RpcServer::new(ServerConfig::new("127.0.0.1:0").with_route_prefix("/:tenant")),
        Err(RpcServerError::InvalidRoutePrefix(_))
    ));

    let server = Arc::new(RpcServer::new(ServerConfig::new("127.0.0.1:0")).unwrap());
    server
        .register(MathServer::new().with_export_methods(&["SumI", "Missing"]))
        .await
        .unwrap();
    let (listener, _) = bind_tcp_listener_on_random_port().await.unwrap();
    match server.clone().serve_with_listener(listener).await {
        Err(RpcServerError::Endpoint(err)) => {
            assert!(err.to_string().contains("invalid export method: MathServer.Missing"))
        }
        other => panic!("expected endpoint configuration error, got {other:?}"),
    }
    assert_eq!(server.state(), ServerState::Idle);
    assert!(server.register(MathServer::new()).await.is_ok());
}
