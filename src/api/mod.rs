pub mod faults;
pub mod health;
pub mod metrics;
pub mod openapi;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::Mutex;

use crate::agent::Agent;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Agent,
    /// Held for the whole of every fault request so they run one at a time
    pub request_lock: Arc<Mutex<()>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            request_lock: Arc::new(Mutex::new(())),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
