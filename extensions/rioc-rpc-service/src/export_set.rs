use rioc::constants::{EXCLUDE_METHODS_CAPABILITY, EXPORT_METHODS_CAPABILITY};
use std::collections::HashSet;

/// Resolves the method names a component exposes remotely.
///
/// Starts from the explicit export list when there is one, otherwise from
/// every public method. The exclude list is then removed. The capability
/// declarations themselves are never exported.
pub fn resolve_export_set(
    public: &[String],
    export: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Vec<String> {
    let mut methods: Vec<String> = export
        .unwrap_or(public)
        .iter()
        .filter(|name| !is_capability(name))
        .cloned()
        .collect();

    if let Some(exclude) = exclude {
        methods.retain(|name| !exclude.contains(name));
    }

    let mut seen = HashSet::new();
    methods.retain(|name| seen.insert(name.clone()));
    methods
}

fn is_capability(name: &str) -> bool {
    name == EXPORT_METHODS_CAPABILITY || name == EXCLUDE_METHODS_CAPABILITY
}
