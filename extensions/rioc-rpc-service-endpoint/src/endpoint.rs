use crate::{DispatchError, MethodTable, RegisteredMethod, RemoteComponent, RpcServiceEndpointError};
use rioc::{ConversionError, FilterChain, Param, Payload, Value, WireCodec, WireError};
use rioc_rpc_service::{ServiceDescriptor, resolve_export_set, route_segment_problem};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A status code and JSON body, ready for whatever transport serves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl EndpointResponse {
    fn json(status: u16, body: &impl serde::Serialize) -> Self {
        match serde_json::to_vec(body) {
            Ok(body) => Self { status, body },
            Err(err) => Self {
                status: 500,
                body: serde_json::json!({ "msg": err.to_string() })
                    .to_string()
                    .into_bytes(),
            },
        }
    }
}

struct ExportedService {
    methods: HashMap<String, RegisteredMethod>,
}

/// The transport-agnostic half of a server: every exported method of every
/// registered component, plus the codec used to talk to callers.
///
/// Immutable once built, so any number of requests may dispatch through it
/// concurrently.
pub struct ServiceEndpoint {
    services: BTreeMap<String, ExportedService>,
    codec: WireCodec,
}

impl std::fmt::Debug for ServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEndpoint")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("codec", &self.codec)
            .finish()
    }
}

/// Collects components and filters, then validates them as a whole.
#[derive(Default)]
pub struct ServiceEndpointBuilder {
    components: Vec<Arc<dyn RemoteComponent>>,
    filters: FilterChain,
}

impl ServiceEndpointBuilder {
    pub fn component(mut self, component: Arc<dyn RemoteComponent>) -> Self {
        self.components.push(component);
        self
    }

    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    /// Resolves every component's export set and method table.
    ///
    /// Fails with all configuration problems found: duplicate service ids,
    /// duplicate or malformed methods, exported names with no method behind
    /// them, and service ids or method names unusable as route segments.
    pub fn build(self) -> Result<ServiceEndpoint, RpcServiceEndpointError> {
        let mut problems = Vec::new();
        let mut services = BTreeMap::new();

        for component in self.components {
            let service_id = component.remote_service_id();
            if let Some(problem) = route_segment_problem(&service_id) {
                problems.push(format!("invalid service id `{service_id}`: {problem}"));
            }
            if services.contains_key(&service_id) {
                problems.push(format!("service id `{service_id}` is registered twice"));
                continue;
            }

            let mut table = MethodTable::new();
            component.clone().register_methods(&mut table);
            let public = table.names();
            let exported = resolve_export_set(
                &public,
                component.export_methods().as_deref(),
                component.exclude_methods().as_deref(),
            );

            let (registered, table_problems) = table.into_parts();
            problems.extend(
                table_problems
                    .into_iter()
                    .map(|problem| format!("{service_id}: {problem}")),
            );

            let mut registered: HashMap<String, RegisteredMethod> = registered
                .into_iter()
                .map(|method| (method.descriptor.name.clone(), method))
                .collect();

            let mut methods = HashMap::with_capacity(exported.len());
            for name in exported {
                if let Some(problem) = route_segment_problem(&name) {
                    problems.push(format!("invalid method name: {service_id}.{name}: {problem}"));
                    continue;
                }
                match registered.remove(&name) {
                    Some(method) => {
                        methods.insert(name, method);
                    }
                    None => problems.push(format!("invalid export method: {service_id}.{name}")),
                }
            }

            services.insert(service_id, ExportedService { methods });
        }

        if !problems.is_empty() {
            return Err(RpcServiceEndpointError::Configuration { problems });
        }

        Ok(ServiceEndpoint {
            services,
            codec: WireCodec::new(self.filters),
        })
    }
}

impl ServiceEndpoint {
    pub fn builder() -> ServiceEndpointBuilder {
        ServiceEndpointBuilder::default()
    }

    /// Every service with its method names sorted, ordered by service id.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.services
            .iter()
            .map(|(service_id, service)| {
                ServiceDescriptor::new(service_id.clone(), service.methods.keys().cloned())
            })
            .collect()
    }

    /// `(service_id, method)` for every exported method.
    pub fn invocation_targets(&self) -> Vec<(String, String)> {
        self.service_descriptors()
            .into_iter()
            .flat_map(|descriptor| {
                let service_id = descriptor.service_id;
                descriptor
                    .methods
                    .into_iter()
                    .map(move |method| (service_id.clone(), method))
            })
            .collect()
    }

    pub fn meta_response(&self) -> EndpointResponse {
        EndpointResponse::json(200, &self.service_descriptors())
    }

    pub fn health_response(&self) -> EndpointResponse {
        EndpointResponse::json(200, &serde_json::json!({ "status": "ok" }))
    }

    /// Parses a raw request body, dispatches it and renders the outcome.
    pub async fn handle_invocation(
        &self,
        service_id: &str,
        method: &str,
        body: &[u8],
    ) -> EndpointResponse {
        let outcome = match serde_json::from_slice::<Payload>(body) {
            Ok(payload) => self.dispatch(service_id, method, payload).await,
            Err(err) => Err(DispatchError::malformed(format!("invalid payload: {err}"))),
        };
        match outcome {
            Ok(payload) => EndpointResponse::json(200, &payload),
            Err(err) => {
                tracing::warn!(service_id, method, status = err.status_code(), "Rejected invocation: {err}");
                EndpointResponse::json(err.status_code(), &err.body())
            }
        }
    }

    /// Validates, decodes, invokes and encodes one call.
    ///
    /// Params may arrive in any order. The target method runs only if every
    /// param passes kind validation and decoding.
    pub async fn dispatch(
        &self,
        service_id: &str,
        method: &str,
        payload: Payload,
    ) -> Result<Payload, DispatchError> {
        let registered = self
            .services
            .get(service_id)
            .and_then(|service| service.methods.get(method))
            .ok_or_else(|| DispatchError::UnknownMethod {
                service_id: service_id.to_string(),
                method: method.to_string(),
            })?;
        let descriptor = &registered.descriptor;
        tracing::debug!(service_id, method, params = payload.len(), "Dispatching invocation");

        let arity = descriptor.params.len();
        let mut slots: Vec<Option<Value>> = vec![None; arity];
        for param in &payload.params {
            let index = param
                .order
                .checked_sub(1)
                .filter(|index| *index < arity)
                .ok_or_else(|| {
                    DispatchError::malformed(format!(
                        "parameter order {} is out of range for `{method}`",
                        param.order
                    ))
                })?;
            let declared = &descriptor.params[index];
            param.validate(declared).map_err(DispatchError::Validation)?;
            let value = self
                .codec
                .decode(param, declared)
                .map_err(|err| DispatchError::Conversion(into_conversion(err, param)))?;
            if slots[index].replace(value).is_some() {
                return Err(DispatchError::malformed(format!(
                    "parameter order {} appears more than once",
                    param.order
                )));
            }
        }

        let mut args = Vec::with_capacity(arity);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(value) => args.push(value),
                // An omitted variadic tail is an empty sequence.
                None if descriptor.is_variadic && index + 1 == arity => {
                    args.push(descriptor.params[index].zero_value())
                }
                None => {
                    return Err(DispatchError::malformed(format!(
                        "parameter {} of `{method}` is missing",
                        index + 1
                    )));
                }
            }
        }

        let returns = (registered.handler)(args).await.map_err(return_failure)?;
        let params = self
            .codec
            .encode_all(&descriptor.returns, &returns)
            .map_err(return_failure)?;
        Ok(Payload::new(params))
    }
}

/// Flattens any codec failure into the conversion body callers understand.
fn into_conversion(err: WireError, param: &Param) -> ConversionError {
    match err {
        WireError::Conversion(conversion) => conversion,
        WireError::UnsupportedInterface { order, kind } => ConversionError {
            order,
            kind: kind.clone(),
            value: param.value.clone(),
            path: String::new(),
            reason: format!("unsupported interface `{kind}`, no filter claims it"),
        },
        other => ConversionError {
            order: param.order,
            kind: param.kind.clone(),
            value: param.value.clone(),
            path: String::new(),
            reason: other.to_string(),
        },
    }
}

fn return_failure(err: WireError) -> DispatchError {
    DispatchError::Conversion(into_conversion(
        err,
        &Param::new(0, "", serde_json::Value::Null),
    ))
}
