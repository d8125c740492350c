use crate::{LoadBalancer, ServiceInvoker};
use rioc_rpc_service::MethodDescriptor;
use std::sync::Arc;

/// A local stand-in for a remote component.
///
/// The client enumerates the proxy's declared methods, binds them to what
/// the backends advertise and hands back a [`ServiceInvoker`] the proxy
/// forwards its calls to.
pub trait RemoteProxy: Send + Sync {
    fn remote_service_id(&self) -> String;

    /// Every method the proxy can forward, with its declared types.
    fn describe_methods(&self) -> Vec<MethodDescriptor>;

    fn register_invoker(&self, invoker: Arc<ServiceInvoker>);

    /// Overrides the client's load-balancing policy for this service.
    fn load_balancer(&self) -> Option<Arc<dyn LoadBalancer>> {
        None
    }
}
