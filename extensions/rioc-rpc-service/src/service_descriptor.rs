use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What one server process publishes about one of its services on the
/// metadata route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service_id: String,
    pub methods: Vec<String>,
}

impl ServiceDescriptor {
    /// Builds a descriptor with its method names sorted ascending.
    pub fn new(service_id: impl Into<String>, methods: impl IntoIterator<Item = String>) -> Self {
        let methods: BTreeSet<String> = methods.into_iter().collect();
        Self {
            service_id: service_id.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// Whether both descriptors expose the same set of methods, regardless of
    /// the order they were listed in.
    pub fn same_contract(&self, other: &ServiceDescriptor) -> bool {
        self.method_set() == other.method_set()
    }

    pub fn method_set(&self) -> BTreeSet<&str> {
        self.methods.iter().map(String::as_str).collect()
    }
}
