use chrono::{TimeZone, Utc};
use example_rioc_rpc_service_definition::{MathServer, MathServerProxy, Obj, Sub};
use rioc::Context;
use rioc_rpc_service::MethodDescriptor;
use rioc_rpc_service_caller::{
    ClientConfig, EndpointHandle, LowestLatency, RemoteClient, RemoteProxy, RoundRobin,
    RpcCallerError, ServiceInvoker,
};
use rioc_rpc_service_endpoint::{LoopbackTransport, MethodTable, RemoteComponent, ServiceEndpoint};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

fn math_endpoint() -> Arc<ServiceEndpoint> {
    Arc::new(
        ServiceEndpoint::builder()
            .component(Arc::new(MathServer::new()))
            .build()
            .unwrap(),
    )
}

async fn connect(
    backends: usize,
    config: ClientConfig,
) -> (Arc<LoopbackTransport>, Arc<MathServerProxy>) {
    let endpoint = math_endpoint();
    let mut transport = LoopbackTransport::new();
    let mut config = config;
    for index in 0..backends {
        let address = format!("backend-{index}");
        transport = transport.with_backend(address.clone(), "/rpc", endpoint.clone());
        config = config.with_backend(address, "/rpc");
    }
    let transport = Arc::new(transport);

    let proxy = Arc::new(MathServerProxy::new());
    let proxies: Vec<Arc<dyn RemoteProxy>> = vec![proxy.clone()];
    RemoteClient::initialize(transport.clone(), config, &proxies)
        .await
        .unwrap();
    (transport, proxy)
}

#[tokio::test]
async fn test_every_method_round_trips() {
    let (_, math) = connect(1, ClientConfig::new()).await;

    assert_eq!(math.sum_i(1, 2).await.unwrap(), 3);
    assert_eq!(math.sum_s("foo", "bar").await.unwrap(), "foobar");
    assert_eq!(math.sum_f(1.5, 2.25).await.unwrap(), 3.75);
    assert!(!math.and(true, false).await.unwrap());
    assert_eq!(math.sum_slice_i(1, &[2, 3, 4]).await.unwrap(), 10);
    assert_eq!(math.sum_array_i(1, [2, 3, 4]).await.unwrap(), 10);
    assert_eq!(math.sum_slice_iv(1, &[2, 3]).await.unwrap(), 6);
    assert_eq!(math.sum_slice_iv(1, &[]).await.unwrap(), 1);

    let obj1 = Obj {
        int: 1,
        string: "a".into(),
        subs: vec![Some(Sub { float: 0.5 }), None],
    };
    let obj2 = Obj {
        int: 2,
        string: "b".into(),
        subs: vec![Some(Sub { float: 1.0 })],
    };
    let sum = math.sum_obj(obj1.clone(), obj2.clone()).await.unwrap();
    assert_eq!(sum.int, 3);
    assert_eq!(sum.string, "ab");
    assert_eq!(sum.subs, vec![Some(Sub { float: 1.5 })]);

    let sum = math.sum_obj_ptr(Some(obj1), None).await.unwrap().unwrap();
    assert_eq!(sum.int, 1);
    assert_eq!(sum.string, "a");

    let t = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();
    assert_eq!(
        math.add_time(t, Duration::from_secs(120)).await.unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 1, 0).unwrap()
    );
    assert_eq!(
        math.add_time_ptr(Some(t), Some(Duration::from_secs(60)))
            .await
            .unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(math.add_time_ptr(Some(t), None).await.unwrap(), t);

    assert_eq!(math.convert_error("").await.unwrap(), "ok");
    let context = Context::background().with_value("trace", "abc");
    assert_eq!(math.with_context(context).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_remote_error_reaches_caller() {
    let (_, math) = connect(1, ClientConfig::new()).await;

    match math.convert_error("division by zero").await {
        Err(RpcCallerError::Application { error, values }) => {
            assert_eq!(error.message(), "division by zero");
            assert_eq!(values.len(), 2);
        }
        other => panic!("expected application error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timestamp_keeps_nanoseconds() {
    let (_, math) = connect(1, ClientConfig::new()).await;

    let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    assert_eq!(math.add_time(t, Duration::ZERO).await.unwrap(), t);
}

#[tokio::test]
async fn test_round_robin_spreads_calls() {
    let (transport, math) = connect(3, ClientConfig::new()).await;

    for _ in 0..6 {
        math.sum_i(1, 1).await.unwrap();
    }
    for index in 0..3 {
        assert_eq!(transport.invocations(&format!("backend-{index}")), 2);
    }
}

#[tokio::test]
async fn test_lowest_latency_across_ten_backends() {
    let config = ClientConfig::new().with_load_balancer(|| LowestLatency);
    let (transport, math) = connect(10, config).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let math = math.clone();
        handles.push(tokio::spawn(async move { math.sum_i(i, i).await }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), 2 * i as i64);
    }

    let total: usize = (0..10)
        .map(|index| transport.invocations(&format!("backend-{index}")))
        .sum();
    assert_eq!(total, 50);
}

#[tokio::test]
async fn test_proxy_load_balancer_overrides_client_default() {
    let endpoint = math_endpoint();
    let transport = Arc::new(
        LoopbackTransport::new()
            .with_backend("a", "", endpoint.clone())
            .with_backend("b", "", endpoint),
    );
    let config = ClientConfig::new().with_backend("a", "").with_backend("b", "");

    let always_last = |endpoints: &[Arc<EndpointHandle>]| endpoints.len() - 1;
    let math = Arc::new(MathServerProxy::new().with_load_balancer(always_last));
    let proxies: Vec<Arc<dyn RemoteProxy>> = vec![math.clone()];
    RemoteClient::initialize(transport.clone(), config, &proxies)
        .await
        .unwrap();

    for _ in 0..3 {
        math.sum_i(1, 1).await.unwrap();
    }
    assert_eq!(transport.invocations("a"), 0);
    assert_eq!(transport.invocations("b"), 3);
}

/// Answers `Backend` with the name of the process hosting it.
struct BackendName {
    service_id: &'static str,
    backend: String,
}

impl RemoteComponent for BackendName {
    fn remote_service_id(&self) -> String {
        self.service_id.to_string()
    }

    fn register_methods(self: Arc<Self>, table: &mut MethodTable) {
        table.method("Backend", move |(): ()| {
            let backend = self.backend.clone();
            async move { (backend,) }
        });
    }
}

struct BackendNameProxy {
    service_id: &'static str,
    invoker: OnceLock<Arc<ServiceInvoker>>,
}

impl BackendNameProxy {
    fn new(service_id: &'static str) -> Self {
        Self {
            service_id,
            invoker: OnceLock::new(),
        }
    }

    async fn backend(&self) -> String {
        let (backend,): (String,) = self
            .invoker
            .get()
            .unwrap()
            .call("Backend", ())
            .await
            .unwrap();
        backend
    }
}

impl RemoteProxy for BackendNameProxy {
    fn remote_service_id(&self) -> String {
        self.service_id.to_string()
    }

    fn describe_methods(&self) -> Vec<MethodDescriptor> {
        vec![MethodDescriptor::of::<(), (String,)>("Backend")]
    }

    fn register_invoker(&self, invoker: Arc<ServiceInvoker>) {
        let _ = self.invoker.set(invoker);
    }
}

#[tokio::test]
async fn test_round_robin_is_per_service() {
    let mut transport = LoopbackTransport::new();
    let mut config = ClientConfig::new().with_load_balancer(RoundRobin::new);
    for index in 0..3 {
        let backend = format!("backend-{index}");
        let endpoint = ServiceEndpoint::builder()
            .component(Arc::new(BackendName {
                service_id: "A",
                backend: backend.clone(),
            }))
            .component(Arc::new(BackendName {
                service_id: "B",
                backend: backend.clone(),
            }))
            .build()
            .unwrap();
        transport = transport.with_backend(backend.clone(), "", Arc::new(endpoint));
        config = config.with_backend(backend, "");
    }

    let a = Arc::new(BackendNameProxy::new("A"));
    let b = Arc::new(BackendNameProxy::new("B"));
    let proxies: Vec<Arc<dyn RemoteProxy>> = vec![a.clone(), b.clone()];
    RemoteClient::initialize(Arc::new(transport), config, &proxies)
        .await
        .unwrap();

    let mut seen_by_a = Vec::new();
    let mut seen_by_b = Vec::new();
    for _ in 0..3 {
        seen_by_a.push(a.backend().await);
        seen_by_b.push(b.backend().await);
    }

    let expected = vec!["backend-0", "backend-1", "backend-2"];
    assert_eq!(seen_by_a, expected);
    assert_eq!(seen_by_b, expected);
}
