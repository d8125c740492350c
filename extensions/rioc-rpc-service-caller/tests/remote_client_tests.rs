use example_rioc_rpc_service_definition::{MATH_SERVER_ID, MathServerProxy};
use rioc_rpc_service_caller::{
    ClientConfig, ClientInitError, EndpointHandle, RemoteClient, RemoteProxy, RpcCallerError,
    RpcTransport, TransportError, TransportResponse,
};
use serde_json::{Value as Json, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Test Setup: Mock Implementations ---

type Responder = Arc<dyn Fn(&str, &Json) -> TransportResponse + Send + Sync>;

/// A transport serving canned metadata per address and answering invocations
/// through a closure. Every POST is recorded.
#[derive(Default)]
struct ScriptedTransport {
    meta: HashMap<String, Json>,
    responders: HashMap<String, Responder>,
    posts: Mutex<Vec<(String, String, Json)>>,
}

impl ScriptedTransport {
    fn backend(mut self, address: &str, meta: Json, responder: Responder) -> Self {
        self.meta.insert(address.to_string(), meta);
        self.responders.insert(address.to_string(), responder);
        self
    }

    fn posts(&self) -> Vec<(String, String, Json)> {
        self.posts.lock().unwrap().clone()
    }
}

fn refused(address: &str) -> TransportError {
    TransportError::Request {
        address: address.to_string(),
        message: "connection refused".to_string(),
    }
}

#[async_trait::async_trait]
impl RpcTransport for ScriptedTransport {
    async fn get(&self, address: &str, path: &str) -> Result<TransportResponse, TransportError> {
        let meta = self.meta.get(address).ok_or_else(|| refused(address))?;
        if !path.ends_with("/meta") {
            return Ok(TransportResponse::new(404, b"Not Found".to_vec()));
        }
        Ok(TransportResponse::new(200, meta.to_string().into_bytes()))
    }

    async fn post(
        &self,
        address: &str,
        path: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, TransportError> {
        let responder = self.responders.get(address).ok_or_else(|| refused(address))?;
        let body: Json = serde_json::from_slice(&body).unwrap();
        self.posts
            .lock()
            .unwrap()
            .push((address.to_string(), path.to_string(), body.clone()));
        Ok(responder(path, &body))
    }
}

fn math_meta() -> Json {
    let methods: Vec<String> = MathServerProxy::new()
        .describe_methods()
        .into_iter()
        .map(|method| method.name)
        .collect();
    json!([{ "service_id": MATH_SERVER_ID, "methods": methods }])
}

fn ok(body: Json) -> TransportResponse {
    TransportResponse::new(200, body.to_string().into_bytes())
}

/// Adds the two int params of a SumI call.
fn sum_i_responder() -> Responder {
    Arc::new(|_path: &str, body: &Json| {
        let sum: i64 = body["params"]
            .as_array()
            .unwrap()
            .iter()
            .map(|param| param["value"].as_i64().unwrap())
            .sum();
        ok(json!({ "params": [{ "order": 1, "kind": "int", "value": sum }] }))
    })
}

async fn connect(
    transport: ScriptedTransport,
    config: ClientConfig,
) -> (Arc<ScriptedTransport>, Arc<MathServerProxy>, Result<RemoteClient, ClientInitError>) {
    let transport = Arc::new(transport);
    let proxy = Arc::new(MathServerProxy::new());
    let proxies: Vec<Arc<dyn RemoteProxy>> = vec![proxy.clone()];
    let client = RemoteClient::initialize(transport.clone(), config, &proxies).await;
    (transport, proxy, client)
}

// --- Discovery ---

#[tokio::test]
async fn test_backends_advertising_same_contract_merge() {
    let transport = ScriptedTransport::default()
        .backend("a:1", math_meta(), sum_i_responder())
        .backend("b:2", math_meta(), sum_i_responder());
    let config = ClientConfig::new()
        .with_backend("a:1", "/rpc")
        .with_backend("b:2", "/rpc/");

    let (_, _, client) = connect(transport, config).await;
    let client = client.unwrap();

    let service = client.registry().service(MATH_SERVER_ID).unwrap();
    let addresses: Vec<&str> = service.endpoints.iter().map(|e| e.address()).collect();
    assert_eq!(addresses, vec!["a:1", "b:2"]);
    assert_eq!(service.endpoints[1].route_prefix(), "/rpc");
}

#[tokio::test]
async fn test_divergent_contracts_abort_initialization() {
    let transport = ScriptedTransport::default()
        .backend(
            "a:1",
            json!([{ "service_id": "MathServer", "methods": ["SumI", "SumS"] }]),
            sum_i_responder(),
        )
        .backend(
            "b:2",
            json!([{ "service_id": "MathServer", "methods": ["SumI"] }]),
            sum_i_responder(),
        );
    let config = ClientConfig::new()
        .with_backend("a:1", "")
        .with_backend("b:2", "");

    let (_, proxy, client) = connect(transport, config).await;
    match client {
        Err(ClientInitError::ContractMismatch { service_id }) => {
            assert_eq!(service_id, "MathServer")
        }
        other => panic!("expected contract mismatch, got {other:?}"),
    }
    assert!(proxy.invoker().is_err());
}

#[tokio::test]
async fn test_unreachable_backend_fails_discovery() {
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), sum_i_responder());
    let config = ClientConfig::new()
        .with_backend("a:1", "")
        .with_backend("missing:9", "");

    let (_, _, client) = connect(transport, config).await;
    assert!(matches!(
        client,
        Err(ClientInitError::Transport(TransportError::Request { .. }))
    ));
}

#[tokio::test]
async fn test_configuration_problems_are_reported_together() {
    let transport = ScriptedTransport::default().backend(
        "a:1",
        json!([{ "service_id": "MathServer", "methods": ["SumI", "Unknown"] }]),
        sum_i_responder(),
    );
    let (_, _, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    match client {
        Err(ClientInitError::Configuration { problems }) => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].contains("Unknown"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }

    let (_, _, client) = connect(ScriptedTransport::default(), ClientConfig::new()).await;
    assert!(matches!(client, Err(ClientInitError::Configuration { .. })));
}

#[tokio::test]
async fn test_service_missing_from_every_backend_is_a_problem() {
    let transport = ScriptedTransport::default().backend("a:1", json!(null), sum_i_responder());
    let (_, _, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    match client {
        Err(ClientInitError::Configuration { problems }) => {
            assert!(problems[0].contains("MathServer"))
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

// --- Invocation ---

#[tokio::test]
async fn test_call_encodes_ordered_params_and_decodes_result() {
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), sum_i_responder());
    let (transport, proxy, client) =
        connect(transport, ClientConfig::new().with_backend("a:1", "/api")).await;
    client.unwrap();

    assert_eq!(proxy.sum_i(2, 3).await.unwrap(), 5);

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    let (address, path, body) = &posts[0];
    assert_eq!(address, "a:1");
    assert_eq!(path, "/api/component/MathServer/methods/SumI");
    assert_eq!(
        body,
        &json!({ "params": [
            { "order": 1, "kind": "int", "value": 2 },
            { "order": 2, "kind": "int", "value": 3 },
        ] })
    );
}

#[tokio::test]
async fn test_round_robin_spreads_calls_over_backends() {
    let transport = ScriptedTransport::default()
        .backend("a:1", math_meta(), sum_i_responder())
        .backend("b:2", math_meta(), sum_i_responder())
        .backend("c:3", math_meta(), sum_i_responder());
    let config = ClientConfig::new()
        .with_backend("a:1", "")
        .with_backend("b:2", "")
        .with_backend("c:3", "");
    let (transport, proxy, client) = connect(transport, config).await;
    client.unwrap();

    for _ in 0..4 {
        proxy.sum_i(1, 1).await.unwrap();
    }
    let addresses: Vec<String> = transport.posts().into_iter().map(|(a, _, _)| a).collect();
    assert_eq!(addresses, vec!["a:1", "b:2", "c:3", "a:1"]);
}

#[tokio::test]
async fn test_validation_rejection_is_surfaced() {
    let responder: Responder = Arc::new(|_: &str, _: &Json| {
        TransportResponse::new(
            400,
            json!({
                "msg": "invalid parameter type",
                "required_param_kind": "int",
                "request_param_kind": "string",
                "param_order": 1,
                "value": "x",
            })
            .to_string()
            .into_bytes(),
        )
    });
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), responder);
    let (_, proxy, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    client.unwrap();

    match proxy.sum_i(1, 2).await {
        Err(RpcCallerError::Validation(err)) => {
            assert_eq!(err.required_param_kind, "int");
            assert_eq!(err.request_param_kind, "string");
            assert_eq!(err.param_order, 1);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unstructured_failure_is_a_transport_error() {
    let responder: Responder =
        Arc::new(|_: &str, _: &Json| TransportResponse::new(502, b"bad gateway".to_vec()));
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), responder);
    let (_, proxy, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    client.unwrap();

    match proxy.sum_i(1, 2).await {
        Err(RpcCallerError::Transport(TransportError::Status { status, body, .. })) => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_return_count_is_an_arity_mismatch() {
    let responder: Responder = Arc::new(|_: &str, _: &Json| {
        ok(json!({ "params": [
            { "order": 1, "kind": "int", "value": 1 },
            { "order": 2, "kind": "int", "value": 2 },
        ] }))
    });
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), responder);
    let (_, proxy, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    client.unwrap();

    assert!(matches!(
        proxy.sum_i(1, 2).await,
        Err(RpcCallerError::ArityMismatch {
            expected: 1,
            actual: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn test_filled_error_slot_is_an_application_error() {
    let responder: Responder = Arc::new(|_: &str, body: &Json| {
        let msg = body["params"][0]["value"].as_str().unwrap_or_default();
        let error = if msg.is_empty() { Json::Null } else { json!(msg) };
        let value = if msg.is_empty() { "ok" } else { "" };
        ok(json!({ "params": [
            { "order": 1, "kind": "string", "value": value },
            { "order": 2, "kind": "error", "value": error },
        ] }))
    });
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), responder);
    let (_, proxy, client) = connect(transport, ClientConfig::new().with_backend("a:1", "")).await;
    client.unwrap();

    assert_eq!(proxy.convert_error("").await.unwrap(), "ok");

    let err = proxy.convert_error("boom").await.unwrap_err();
    assert_eq!(err.remote_error().map(|e| e.message()), Some("boom"));
}

#[tokio::test]
async fn test_out_of_range_selection_is_rejected() {
    let transport = ScriptedTransport::default().backend("a:1", math_meta(), sum_i_responder());
    let config = ClientConfig::new()
        .with_backend("a:1", "")
        .with_load_balancer(|| |endpoints: &[Arc<EndpointHandle>]| endpoints.len());
    let (transport, proxy, client) = connect(transport, config).await;
    client.unwrap();

    assert!(matches!(
        proxy.sum_i(1, 2).await,
        Err(RpcCallerError::InvalidEndpointIndex { index: 1, len: 1 })
    ));
    assert!(transport.posts().is_empty());
}
