use crate::MethodTable;
use std::sync::Arc;

/// A component whose methods are callable from other processes.
///
/// `register_methods` is the component's public surface: every handler it
/// adds is a candidate for export. `export_methods` replaces that default
/// set, `exclude_methods` trims it.
pub trait RemoteComponent: Send + Sync + 'static {
    fn remote_service_id(&self) -> String;

    fn register_methods(self: Arc<Self>, table: &mut MethodTable);

    fn export_methods(&self) -> Option<Vec<String>> {
        None
    }

    fn exclude_methods(&self) -> Option<Vec<String>> {
        None
    }
}
