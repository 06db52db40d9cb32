//! Agent client used by the CLI
//!
//! Sends one request per host and reports each host on its own; a failing
//! host never stops the others.

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::AGENT_PORT;
use crate::fault::FaultRequest;

/// Result of one request against one agent
#[derive(Debug, Clone)]
pub struct HostOutcome {
    pub host: String,
    pub result: Result<(StatusCode, String), String>,
}

impl HostOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok((status, _)) if *status == StatusCode::OK)
    }

    /// `<host>: <reason>`, followed by the body when the agent did not answer 200
    pub fn report(&self) -> String {
        match &self.result {
            Ok((status, body)) => {
                let reason = status.canonical_reason().unwrap_or("Unknown");
                if *status == StatusCode::OK {
                    format!("{}: {}", self.host, reason)
                } else {
                    format!("{}: {}\n{}", self.host, reason, body)
                }
            }
            Err(e) => format!("{}: {}", self.host, e),
        }
    }
}

#[derive(Clone)]
pub struct AgentClient {
    http: Client,
    port: u16,
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new(AGENT_PORT)
    }
}

impl AgentClient {
    pub fn new(port: u16) -> Self {
        Self {
            http: Client::new(),
            port,
        }
    }

    pub fn agent_url(&self, host: &str) -> String {
        format!("http://{}:{}/", host.trim(), self.port)
    }

    /// POST the fault to every host
    pub async fn add(&self, hosts: &[String], request: &FaultRequest) -> Vec<HostOutcome> {
        let mut outcomes = Vec::with_capacity(hosts.len());
        for host in hosts {
            let url = self.agent_url(host);
            debug!("POST {}", url);
            let result = self.http.post(&url).json(request).send().await;
            outcomes.push(Self::outcome(host, result).await);
        }
        outcomes
    }

    /// DELETE on every host
    pub async fn reset(&self, hosts: &[String]) -> Vec<HostOutcome> {
        let mut outcomes = Vec::with_capacity(hosts.len());
        for host in hosts {
            let url = self.agent_url(host);
            debug!("DELETE {}", url);
            let result = self.http.delete(&url).send().await;
            outcomes.push(Self::outcome(host, result).await);
        }
        outcomes
    }

    async fn outcome(
        host: &str,
        response: reqwest::Result<reqwest::Response>,
    ) -> HostOutcome {
        let result = match response {
            Ok(response) => {
                let status = response.status();
                response
                    .text()
                    .await
                    .map(|body| (status, body))
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };
        HostOutcome {
            host: host.to_string(),
            result,
        }
    }
}
