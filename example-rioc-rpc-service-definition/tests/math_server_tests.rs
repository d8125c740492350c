use chrono::{DateTime, TimeZone, Utc};
use example_rioc_rpc_service_definition::{MathServer, MathServerProxy, Obj, Sub};
use rioc_rpc_service_caller::{RemoteProxy, RpcCallerError};
use rioc_rpc_service_endpoint::{MethodTable, RemoteComponent};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn proxy_declares_exactly_what_the_server_registers() {
    let mut table = MethodTable::new();
    Arc::new(MathServer::new()).register_methods(&mut table);
    assert!(table.problems().is_empty(), "{:?}", table.problems());

    let declared = MathServerProxy::new().describe_methods();
    assert_eq!(declared.len(), table.names().len());
    for descriptor in declared {
        let registered = table
            .get(&descriptor.name)
            .unwrap_or_else(|| panic!("server lacks {}", descriptor.name));
        assert_eq!(registered.descriptor, descriptor);
    }
}

#[test]
fn integer_sums_wrap_on_overflow() {
    let server = MathServer::new();
    assert_eq!(server.sum_i(i64::MAX, 1), i64::MIN);
    assert_eq!(server.sum_slice_i(i64::MAX, &[1, 1]), i64::MIN + 1);
    assert_eq!(server.sum_array_i(i64::MIN, [-1, 0, 0]), i64::MAX);
}

#[test]
fn sum_obj_adds_fields_and_collapses_subs() {
    let server = MathServer::new();
    let obj1 = Obj {
        int: 1,
        string: "a".into(),
        subs: vec![Some(Sub { float: 1.5 }), None],
    };
    let obj2 = Obj {
        int: 2,
        string: "b".into(),
        subs: vec![Some(Sub { float: 2.0 })],
    };

    let sum = server.sum_obj(&obj1, &obj2);
    assert_eq!(sum.int, 3);
    assert_eq!(sum.string, "ab");
    assert_eq!(sum.subs, vec![Some(Sub { float: 3.5 })]);

    let with_nil = server.sum_obj_ptr(Some(&obj1), None).unwrap();
    assert_eq!(with_nil.int, 1);
}

#[test]
fn add_time_handles_missing_pointers() {
    let server = MathServer::new();
    let t: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(
        server.add_time(t, Duration::from_secs(60)),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap()
    );
    assert_eq!(server.add_time_ptr(Some(t), None), t);
    assert_eq!(server.add_time_ptr(None, None), DateTime::UNIX_EPOCH);
}

#[test]
fn convert_error_reports_non_empty_messages() {
    let server = MathServer::new();
    assert_eq!(server.convert_error(""), ("ok".to_string(), Ok(())));

    let (value, err) = server.convert_error("boom");
    assert!(value.is_empty());
    assert_eq!(err.unwrap_err().message(), "boom");
}

#[tokio::test]
async fn unbound_proxy_refuses_calls() {
    let proxy = MathServerProxy::new();
    let err = proxy.sum_i(1, 2).await.unwrap_err();
    assert!(matches!(err, RpcCallerError::Unbound { .. }));
}
