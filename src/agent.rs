//! Fault installation pipeline
//!
//! validate → discover interfaces (tc faults only) → build commands →
//! execute fail-fast. Reset is best effort and always succeeds.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::fault::{validate, CommandBuilder, Fault};
use crate::interfaces;
use crate::shell::{run_all, CommandResult, ExecPolicy, Shell};

#[derive(Clone)]
pub struct Agent {
    shell: Arc<dyn Shell>,
    builder: CommandBuilder,
}

impl Agent {
    pub fn new(shell: Arc<dyn Shell>, builder: CommandBuilder) -> Self {
        Self { shell, builder }
    }

    pub fn from_config(shell: Arc<dyn Shell>, config: &Config) -> Self {
        Self::new(
            shell,
            CommandBuilder::new(&config.iptables_cmd, &config.tc_cmd),
        )
    }

    /// Validate `body` and install the fault it describes
    pub async fn add_fault(&self, body: &Value) -> AppResult<Fault> {
        let fault = validate(body)?;
        self.install(&fault).await?;
        Ok(fault)
    }

    /// Install an already validated fault.
    ///
    /// A failing command aborts the rest of the sequence; earlier commands
    /// are not rolled back.
    pub async fn install(&self, fault: &Fault) -> AppResult<()> {
        info!(
            "Installing fault '{}' (type={}, direction={}, port={})",
            fault.target.name,
            fault.fault_type(),
            fault.target.direction,
            fault.target.to_port
        );

        let interfaces = if fault.fault_type().uses_traffic_control() {
            interfaces::discover(self.shell.as_ref()).await?
        } else {
            Vec::new()
        };

        let commands = self.builder.fault_commands(fault, &interfaces);
        run_all(self.shell.as_ref(), &commands, ExecPolicy::FailFast).await?;

        info!("Fault '{}' installed", fault.target.name);
        Ok(())
    }

    /// Flush iptables and remove the root qdisc of every interface
    pub async fn reset(&self) -> Vec<CommandResult> {
        info!("Resetting all faults");

        let interfaces = match interfaces::discover(self.shell.as_ref()).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!("Interface discovery failed during reset: {}", e);
                Vec::new()
            }
        };

        let commands = self.builder.reset_commands(&interfaces);
        match run_all(self.shell.as_ref(), &commands, ExecPolicy::IgnoreErrors).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Reset did not complete: {}", e);
                Vec::new()
            }
        }
    }
}
