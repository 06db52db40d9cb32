use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Privileged iptables invocation prefix
    #[serde(default = "default_iptables_cmd")]
    pub iptables_cmd: String,

    /// Privileged tc invocation prefix
    #[serde(default = "default_tc_cmd")]
    pub tc_cmd: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

/// Port the agent listens on and the CLI connects to
pub const AGENT_PORT: u16 = 6660;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    AGENT_PORT
}

fn default_iptables_cmd() -> String {
    "sudo /sbin/iptables".to_string()
}

fn default_tc_cmd() -> String {
    "sudo /sbin/tc".to_string()
}

fn default_log_dir() -> String {
    "/var/log/saboteur".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SABOTEUR"))
            .build()?;

        let settings: Config = config
            .try_deserialize()
            .unwrap_or_else(|_| Config::default());

        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            iptables_cmd: default_iptables_cmd(),
            tc_cmd: default_tc_cmd(),
            log_dir: default_log_dir(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}
