use crate::{EndpointHandle, LoadBalancer, RpcCallerError, RpcTransport, TransportError};
use rioc::{
    ConversionError, Payload, RemoteTuple, TypeTag, ValidationError, Value, WireCodec,
};
use rioc_rpc_service::{MethodDescriptor, invocation_route};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Makes outgoing calls for one remote service.
///
/// Holds the service's endpoints, its load-balancing policy and the declared
/// shape of every method bound at start-up. Cheap to share behind an `Arc`;
/// every method takes `&self`.
pub struct ServiceInvoker {
    service_id: String,
    transport: Arc<dyn RpcTransport>,
    endpoints: Vec<Arc<EndpointHandle>>,
    load_balancer: Arc<dyn LoadBalancer>,
    methods: HashMap<String, MethodDescriptor>,
    codec: WireCodec,
    debug: bool,
}

impl ServiceInvoker {
    pub fn new(
        service_id: impl Into<String>,
        transport: Arc<dyn RpcTransport>,
        endpoints: Vec<Arc<EndpointHandle>>,
        load_balancer: Arc<dyn LoadBalancer>,
        methods: Vec<MethodDescriptor>,
        codec: WireCodec,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            transport,
            endpoints,
            load_balancer,
            methods: methods
                .into_iter()
                .map(|method| (method.name.clone(), method))
                .collect(),
            codec,
            debug: false,
        }
    }

    /// Logs full request and response payloads at `info` level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn endpoints(&self) -> &[Arc<EndpointHandle>] {
        &self.endpoints
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Calls `method` with positional argument values and returns the decoded
    /// return values.
    ///
    /// When the method's last return slot is the error capability and the
    /// remote side filled it, the call fails with
    /// [`RpcCallerError::Application`], which still carries every value.
    pub async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>, RpcCallerError> {
        let descriptor = self
            .methods
            .get(method)
            .ok_or_else(|| RpcCallerError::MethodNotFound {
                service_id: self.service_id.clone(),
                method: method.to_string(),
            })?;

        let endpoint = self.select_endpoint()?;

        let params = self.codec.encode_all(&descriptor.params, &args)?;
        let body = serde_json::to_vec(&Payload::new(params))?;
        let path = invocation_route(endpoint.route_prefix(), &self.service_id, method);

        if self.debug {
            tracing::info!(
                address = %endpoint.address(),
                path = %path,
                request = %String::from_utf8_lossy(&body),
                "Remote call request"
            );
        }

        let started = Instant::now();
        let response = self.transport.post(endpoint.address(), &path, body).await?;
        let latency = started.elapsed();
        endpoint.record_latency(latency);

        tracing::debug!(
            service_id = %self.service_id,
            method,
            address = %endpoint.address(),
            status = response.status,
            latency = ?latency,
            "Remote call completed"
        );
        if self.debug {
            tracing::info!(
                address = %endpoint.address(),
                path = %path,
                status = response.status,
                response = %response.body_text(),
                "Remote call response"
            );
        }

        if !response.is_success() {
            return Err(rejection(endpoint.address(), response.status, &response.body));
        }

        let payload: Payload =
            serde_json::from_slice(&response.body).map_err(|err| RpcCallerError::MalformedResponse {
                address: endpoint.address().to_string(),
                reason: err.to_string(),
            })?;

        let values = self.decode_returns(endpoint.address(), descriptor, payload)?;

        if descriptor.returns_error() {
            if let Some(error) = values.last().and_then(Value::as_remote_error) {
                return Err(RpcCallerError::Application {
                    error: error.clone(),
                    values,
                });
            }
        }
        Ok(values)
    }

    /// Typed form of [`ServiceInvoker::invoke`]: `P` is the parameter tuple,
    /// `R` the return tuple.
    pub async fn call<P, R>(&self, method: &str, args: P) -> Result<R, RpcCallerError>
    where
        P: RemoteTuple,
        R: RemoteTuple,
    {
        let values = self.invoke(method, args.into_values()).await?;
        Ok(R::from_values(values)?)
    }

    fn select_endpoint(&self) -> Result<&Arc<EndpointHandle>, RpcCallerError> {
        if self.endpoints.is_empty() {
            return Err(RpcCallerError::NoEndpoints {
                service_id: self.service_id.clone(),
            });
        }
        let index = self.load_balancer.select(&self.endpoints);
        self.endpoints
            .get(index)
            .ok_or(RpcCallerError::InvalidEndpointIndex {
                index,
                len: self.endpoints.len(),
            })
    }

    fn decode_returns(
        &self,
        address: &str,
        descriptor: &MethodDescriptor,
        payload: Payload,
    ) -> Result<Vec<Value>, RpcCallerError> {
        let expected = descriptor.returns.len();
        if payload.len() != expected {
            return Err(RpcCallerError::ArityMismatch {
                method: descriptor.name.clone(),
                expected,
                actual: payload.len(),
            });
        }

        let malformed = |reason: String| RpcCallerError::MalformedResponse {
            address: address.to_string(),
            reason,
        };

        let mut slots: Vec<Option<Value>> = vec![None; expected];
        for param in &payload.params {
            let declared: &TypeTag = param
                .order
                .checked_sub(1)
                .and_then(|index| descriptor.returns.get(index))
                .ok_or_else(|| malformed(format!("return order {} out of range", param.order)))?;
            param.validate(declared).map_err(RpcCallerError::Validation)?;
            let value = self.codec.decode(param, declared)?;
            let slot = &mut slots[param.order - 1];
            if slot.is_some() {
                return Err(malformed(format!("duplicate return order {}", param.order)));
            }
            *slot = Some(value);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| malformed(format!("missing return order {}", index + 1))))
            .collect()
    }
}

impl fmt::Debug for ServiceInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInvoker")
            .field("service_id", &self.service_id)
            .field("endpoints", &self.endpoints)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("debug", &self.debug)
            .finish()
    }
}

/// Maps a non-2xx response to the structured error the server sent, falling
/// back to an opaque transport error.
fn rejection(address: &str, status: u16, body: &[u8]) -> RpcCallerError {
    if let Ok(validation) = serde_json::from_slice::<ValidationError>(body) {
        return RpcCallerError::Validation(validation);
    }
    if let Ok(conversion) = serde_json::from_slice::<ConversionError>(body) {
        return RpcCallerError::Conversion(conversion);
    }
    RpcCallerError::Transport(TransportError::Status {
        address: address.to_string(),
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}
