use clap::{Args, Parser, Subcommand};

use crate::fault::FaultRequest;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inject network faults on remote saboteur agents", long_about = None)]
pub struct Cli {
    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a fault on every host
    Add(AddArgs),
    /// Remove all faults from every host
    Reset(HostsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct HostsArgs {
    /// Comma-separated agent hosts
    #[arg(long, value_delimiter = ',', required = true)]
    pub hosts: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub hosts: HostsArgs,

    /// Label for the fault
    #[arg(long)]
    pub name: String,

    /// NETWORK_FAILURE, SERVICE_FAILURE, FIREWALL_TIMEOUT, DELAY or PACKET_LOSS
    #[arg(long = "fault_type")]
    pub fault_type: String,

    /// IN or OUT
    #[arg(long)]
    pub direction: String,

    #[arg(long = "to_port")]
    pub to_port: i64,

    /// Source host filter
    #[arg(long)]
    pub from: Option<String>,

    /// Destination host filter
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub protocol: Option<String>,

    /// Seconds before established connections expire (FIREWALL_TIMEOUT)
    #[arg(long)]
    pub timeout: Option<i64>,

    /// Added latency in ms (DELAY)
    #[arg(long)]
    pub delay: Option<i64>,

    /// Jitter in ms (DELAY)
    #[arg(long)]
    pub variance: Option<i64>,

    #[arg(long)]
    pub correlation: Option<i64>,

    /// netem distribution (DELAY)
    #[arg(long)]
    pub distribution: Option<String>,

    /// Loss percentage (PACKET_LOSS)
    #[arg(long)]
    pub probability: Option<f64>,
}

impl AddArgs {
    /// JSON payload for the agent; flags not given are left out
    pub fn to_request(&self) -> FaultRequest {
        FaultRequest {
            name: self.name.clone(),
            fault_type: self.fault_type.clone(),
            direction: self.direction.clone(),
            to_port: self.to_port,
            from: self.from.clone(),
            to: self.to.clone(),
            protocol: self.protocol.clone(),
            timeout: self.timeout,
            delay: self.delay,
            variance: self.variance,
            correlation: self.correlation,
            distribution: self.distribution.clone(),
            probability: self.probability,
        }
    }
}
