/// Route serving the JSON array of service descriptors hosted by a process.
pub const ROUTE_META: &str = "/meta";

/// Route serving the liveness probe (`{"status": "ok"}`).
pub const ROUTE_HEALTH: &str = "/health";

/// Prefix of every invocation route; the full shape is
/// `/component/{service_id}/methods/{method_name}`.
pub const ROUTE_COMPONENT: &str = "/component";

/// Segment separating the service id from the method name in invocation routes.
pub const ROUTE_METHODS_SEGMENT: &str = "methods";

/// Wire `kind` of the generic error capability.
pub const ERROR_INTERFACE_NAME: &str = "error";

/// Wire `kind` of the execution-context capability.
pub const CONTEXT_INTERFACE_NAME: &str = "context.Context";

/// Capability-defining method names. These are never exported, even when a
/// component lists them explicitly.
pub const EXPORT_METHODS_CAPABILITY: &str = "ExportMethods";
pub const EXCLUDE_METHODS_CAPABILITY: &str = "ExcludeMethods";
