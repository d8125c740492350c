use crate::{MATH_SERVER_ID, Obj};
use chrono::{DateTime, Utc};
use rioc::{Context, RemoteError};
use rioc_rpc_service::MethodDescriptor;
use rioc_rpc_service_caller::{LoadBalancer, RemoteProxy, RpcCallerError, ServiceInvoker};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Client-side counterpart of [`MathServer`](crate::MathServer).
///
/// Every method forwards to the invoker the client binds at start-up and
/// fails with [`RpcCallerError::Unbound`] before that.
#[derive(Default)]
pub struct MathServerProxy {
    invoker: OnceLock<Arc<ServiceInvoker>>,
    load_balancer: Option<Arc<dyn LoadBalancer>>,
}

impl MathServerProxy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `load_balancer` for this service instead of the client default.
    pub fn with_load_balancer<L>(mut self, load_balancer: L) -> Self
    where
        L: LoadBalancer + 'static,
    {
        self.load_balancer = Some(Arc::new(load_balancer));
        self
    }

    pub fn invoker(&self) -> Result<&Arc<ServiceInvoker>, RpcCallerError> {
        self.invoker.get().ok_or_else(|| RpcCallerError::Unbound {
            service_id: MATH_SERVER_ID.to_string(),
        })
    }

    pub async fn sum_i(&self, base: i64, add: i64) -> Result<i64, RpcCallerError> {
        let (sum,) = self.invoker()?.call("SumI", (base, add)).await?;
        Ok(sum)
    }

    pub async fn sum_s(&self, base: &str, add: &str) -> Result<String, RpcCallerError> {
        let (sum,) = self
            .invoker()?
            .call("SumS", (base.to_string(), add.to_string()))
            .await?;
        Ok(sum)
    }

    pub async fn sum_f(&self, base: f64, add: f64) -> Result<f64, RpcCallerError> {
        let (sum,) = self.invoker()?.call("SumF", (base, add)).await?;
        Ok(sum)
    }

    pub async fn and(&self, b1: bool, b2: bool) -> Result<bool, RpcCallerError> {
        let (and,) = self.invoker()?.call("And", (b1, b2)).await?;
        Ok(and)
    }

    pub async fn sum_slice_i(&self, base: i64, add: &[i64]) -> Result<i64, RpcCallerError> {
        let (sum,) = self
            .invoker()?
            .call("SumSliceI", (base, add.to_vec()))
            .await?;
        Ok(sum)
    }

    pub async fn sum_array_i(&self, base: i64, add: [i64; 3]) -> Result<i64, RpcCallerError> {
        let (sum,) = self.invoker()?.call("SumArrayI", (base, add)).await?;
        Ok(sum)
    }

    pub async fn sum_slice_iv(&self, base: i64, add: &[i64]) -> Result<i64, RpcCallerError> {
        let (sum,) = self
            .invoker()?
            .call("SumSliceIV", (base, add.to_vec()))
            .await?;
        Ok(sum)
    }

    pub async fn sum_obj(&self, obj1: Obj, obj2: Obj) -> Result<Obj, RpcCallerError> {
        let (sum,) = self.invoker()?.call("SumObj", (obj1, obj2)).await?;
        Ok(sum)
    }

    pub async fn sum_obj_ptr(
        &self,
        obj1: Option<Obj>,
        obj2: Option<Obj>,
    ) -> Result<Option<Obj>, RpcCallerError> {
        let (sum,) = self.invoker()?.call("SumObjPtr", (obj1, obj2)).await?;
        Ok(sum)
    }

    pub async fn add_time(
        &self,
        t: DateTime<Utc>,
        duration: Duration,
    ) -> Result<DateTime<Utc>, RpcCallerError> {
        let (sum,) = self.invoker()?.call("AddTime", (t, duration)).await?;
        Ok(sum)
    }

    pub async fn add_time_ptr(
        &self,
        t: Option<DateTime<Utc>>,
        duration: Option<Duration>,
    ) -> Result<DateTime<Utc>, RpcCallerError> {
        let (sum,) = self.invoker()?.call("AddTimePtr", (t, duration)).await?;
        Ok(sum)
    }

    /// A non-empty `msg` comes back as [`RpcCallerError::Application`].
    pub async fn convert_error(&self, msg: &str) -> Result<String, RpcCallerError> {
        let (converted, _): (String, Result<(), RemoteError>) = self
            .invoker()?
            .call("ConvertError", (msg.to_string(),))
            .await?;
        Ok(converted)
    }

    pub async fn with_context(&self, ctx: Context) -> Result<String, RpcCallerError> {
        let (result,) = self.invoker()?.call("WithContext", (ctx,)).await?;
        Ok(result)
    }
}

impl RemoteProxy for MathServerProxy {
    fn remote_service_id(&self) -> String {
        MATH_SERVER_ID.to_string()
    }

    fn describe_methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::of::<(i64, i64), (i64,)>("SumI"),
            MethodDescriptor::of::<(String, String), (String,)>("SumS"),
            MethodDescriptor::of::<(f64, f64), (f64,)>("SumF"),
            MethodDescriptor::of::<(bool, bool), (bool,)>("And"),
            MethodDescriptor::of::<(i64, Vec<i64>), (i64,)>("SumSliceI"),
            MethodDescriptor::of::<(i64, [i64; 3]), (i64,)>("SumArrayI"),
            MethodDescriptor::variadic::<(i64, Vec<i64>), (i64,)>("SumSliceIV"),
            MethodDescriptor::of::<(Obj, Obj), (Obj,)>("SumObj"),
            MethodDescriptor::of::<(Option<Obj>, Option<Obj>), (Option<Obj>,)>("SumObjPtr"),
            MethodDescriptor::of::<(DateTime<Utc>, Duration), (DateTime<Utc>,)>("AddTime"),
            MethodDescriptor::of::<(Option<DateTime<Utc>>, Option<Duration>), (DateTime<Utc>,)>(
                "AddTimePtr",
            ),
            MethodDescriptor::of::<(String,), (String, Result<(), RemoteError>)>("ConvertError"),
            MethodDescriptor::of::<(Context,), (String,)>("WithContext"),
        ]
    }

    fn register_invoker(&self, invoker: Arc<ServiceInvoker>) {
        // First binding wins; a client binds each proxy once.
        let _ = self.invoker.set(invoker);
    }

    fn load_balancer(&self) -> Option<Arc<dyn LoadBalancer>> {
        self.load_balancer.clone()
    }
}
