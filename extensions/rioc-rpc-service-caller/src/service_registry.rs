use crate::{BackendConfig, ClientInitError, EndpointHandle, RpcTransport, TransportError};
use futures::future::join_all;
use rioc_rpc_service::{ServiceDescriptor, meta_route};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A discovered service: its agreed contract and every backend serving it.
#[derive(Debug, Clone)]
pub struct RegisteredService {
    pub descriptor: ServiceDescriptor,
    pub endpoints: Vec<Arc<EndpointHandle>>,
}

/// Services discovered across all configured backends.
///
/// Built once at client start-up; discovery does not re-poll.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, RegisteredService>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries every backend's metadata route and merges the results.
    ///
    /// Backends are queried concurrently but merged in configuration order,
    /// so the first backend listing a service defines its contract.
    pub async fn discover(
        transport: &dyn RpcTransport,
        backends: &[BackendConfig],
    ) -> Result<Self, ClientInitError> {
        let responses = join_all(
            backends
                .iter()
                .map(|backend| fetch_descriptors(transport, backend)),
        )
        .await;

        let mut registry = Self::new();
        for (backend, response) in backends.iter().zip(responses) {
            let (descriptors, round_trip) = response?;
            tracing::info!(
                address = %backend.address,
                services = descriptors.len(),
                round_trip = ?round_trip,
                "Discovered backend"
            );
            for descriptor in descriptors {
                let endpoint = Arc::new(EndpointHandle::new(
                    backend.address.clone(),
                    backend.route_prefix.clone(),
                    round_trip,
                ));
                registry.register(descriptor, endpoint)?;
            }
        }
        Ok(registry)
    }

    /// Records one backend's descriptor for a service.
    ///
    /// A service seen before must advertise the same method set, otherwise
    /// registration fails with [`ClientInitError::ContractMismatch`].
    pub fn register(
        &mut self,
        descriptor: ServiceDescriptor,
        endpoint: Arc<EndpointHandle>,
    ) -> Result<(), ClientInitError> {
        match self.services.get_mut(&descriptor.service_id) {
            Some(known) => {
                if !known.descriptor.same_contract(&descriptor) {
                    tracing::error!(
                        service_id = %descriptor.service_id,
                        address = %endpoint.address(),
                        "Remote component contract differs between backends"
                    );
                    return Err(ClientInitError::ContractMismatch {
                        service_id: descriptor.service_id,
                    });
                }
                known.endpoints.push(endpoint);
            }
            None => {
                self.services.insert(
                    descriptor.service_id.clone(),
                    RegisteredService {
                        descriptor,
                        endpoints: vec![endpoint],
                    },
                );
            }
        }
        Ok(())
    }

    pub fn service(&self, service_id: &str) -> Option<&RegisteredService> {
        self.services.get(service_id)
    }

    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

async fn fetch_descriptors(
    transport: &dyn RpcTransport,
    backend: &BackendConfig,
) -> Result<(Vec<ServiceDescriptor>, Duration), ClientInitError> {
    let started = Instant::now();
    let response = transport
        .get(&backend.address, &meta_route(&backend.route_prefix))
        .await?;
    let round_trip = started.elapsed();

    if !response.is_success() {
        return Err(TransportError::Status {
            address: backend.address.clone(),
            status: response.status,
            body: response.body_text(),
        }
        .into());
    }

    let descriptors = serde_json::from_slice::<Option<Vec<ServiceDescriptor>>>(&response.body)
        .map_err(|err| ClientInitError::MalformedMetadata {
            address: backend.address.clone(),
            reason: err.to_string(),
        })?
        .unwrap_or_default();
    Ok((descriptors, round_trip))
}
