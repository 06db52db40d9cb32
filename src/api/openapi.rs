//! OpenAPI documentation for the agent API

use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Saboteur Agent API",
        version = "0.1.0",
        description = "Installs and removes network faults on the host using iptables and tc/netem.\n\n## Fault types\n- NETWORK_FAILURE: drop packets\n- SERVICE_FAILURE: reset connections\n- FIREWALL_TIMEOUT: expire established connections\n- DELAY: add latency\n- PACKET_LOSS: drop a percentage of packets",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:6660", description = "Local agent")
    ),
    tags(
        (name = "faults", description = "Install and reset network faults"),
        (name = "agent", description = "Agent status")
    ),
    paths(
        crate::api::faults::add,
        crate::api::faults::reset,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::fault::FaultRequest,
            crate::fault::FaultType,
            crate::fault::Direction,
            ErrorsResponse,
            HealthSchema,
        )
    )
)]
pub struct ApiDoc;

/// Field errors returned with a 400 response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorsResponse {
    /// Field name to message
    #[schema(example = json!({"to_port": "expected int", "name": "required key not provided"}))]
    pub errors: std::collections::BTreeMap<String, String>,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthSchema {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_fault_endpoints() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(spec["paths"]["/"]["post"].is_object());
        assert!(spec["paths"]["/"]["delete"].is_object());
        assert!(spec["components"]["schemas"]["FaultRequest"].is_object());
    }
}
