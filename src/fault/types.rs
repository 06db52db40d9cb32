//! Fault types and request models

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};
use utoipa::ToSchema;

/// Kinds of network faults the agent can install
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumVariantNames,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultType {
    /// Silently drop matching packets
    NetworkFailure,
    /// Reset matching connections with a TCP RST
    ServiceFailure,
    /// Let established connections age out after a timeout
    FirewallTimeout,
    /// Add latency through netem
    Delay,
    /// Drop a percentage of packets through netem
    PacketLoss,
}

impl FaultType {
    /// Returns true if this fault is installed with tc/netem rather than iptables
    pub fn uses_traffic_control(&self) -> bool {
        matches!(self, FaultType::Delay | FaultType::PacketLoss)
    }
}

/// Traffic direction relative to the host
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    /// Inbound traffic
    In,
    /// Outbound traffic
    Out,
}

impl Direction {
    /// iptables chain the direction maps to
    pub fn chain(&self) -> &'static str {
        match self {
            Direction::In => "INPUT",
            Direction::Out => "OUTPUT",
        }
    }

    /// u32 match keyword used by the tc port filter
    pub fn port_match(&self) -> &'static str {
        match self {
            Direction::In => "sport",
            Direction::Out => "dport",
        }
    }
}

pub const DEFAULT_PROTOCOL: &str = "TCP";

/// Packet filter shared by every fault type
#[derive(Debug, Clone, PartialEq)]
pub struct FaultTarget {
    pub name: String,
    pub direction: Direction,
    pub to_port: i64,
    pub from: Option<String>,
    pub to: Option<String>,
    pub protocol: String,
}

/// netem delay settings
#[derive(Debug, Clone, PartialEq)]
pub struct DelayParams {
    /// Added latency in milliseconds
    pub delay: i64,
    /// Jitter in milliseconds
    pub variance: Option<i64>,
    /// Correlation percentage, ignored when a distribution is set
    pub correlation: Option<i64>,
    /// netem distribution table (normal, pareto, ...)
    pub distribution: Option<String>,
    /// Accepted for compatibility, not used by netem delay
    pub probability: Option<f64>,
}

/// netem loss settings
#[derive(Debug, Clone, PartialEq)]
pub struct PacketLossParams {
    /// Loss percentage; every matching packet is dropped when absent
    pub probability: Option<f64>,
    /// Correlation percentage
    pub correlation: Option<i64>,
}

/// Type-specific part of a fault
#[derive(Debug, Clone, PartialEq)]
pub enum FaultKind {
    NetworkFailure,
    ServiceFailure,
    FirewallTimeout { timeout: i64 },
    Delay(DelayParams),
    PacketLoss(PacketLossParams),
}

/// A fully validated fault, ready to be turned into shell commands
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub target: FaultTarget,
    pub kind: FaultKind,
}

impl Fault {
    pub fn fault_type(&self) -> FaultType {
        match self.kind {
            FaultKind::NetworkFailure => FaultType::NetworkFailure,
            FaultKind::ServiceFailure => FaultType::ServiceFailure,
            FaultKind::FirewallTimeout { .. } => FaultType::FirewallTimeout,
            FaultKind::Delay(_) => FaultType::Delay,
            FaultKind::PacketLoss(_) => FaultType::PacketLoss,
        }
    }
}

/// Wire shape of a fault request, as sent by the CLI and documented in OpenAPI.
///
/// The agent never deserializes straight into this type: bodies go through
/// the validator so every field problem is reported at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FaultRequest {
    /// Human-readable label
    #[schema(example = "isolate-web-server")]
    pub name: String,
    /// Fault type
    #[serde(rename = "type")]
    #[schema(example = "NETWORK_FAILURE")]
    pub fault_type: String,
    /// IN or OUT
    #[schema(example = "IN")]
    pub direction: String,
    /// Port used as the packet filter
    #[schema(example = 80)]
    pub to_port: i64,
    /// Source host filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Destination host filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Transport protocol, defaults to TCP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// FIREWALL_TIMEOUT: seconds before established connections expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    /// DELAY: latency in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,
    /// DELAY: jitter in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<i64>,
    /// DELAY / PACKET_LOSS: correlation percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<i64>,
    /// DELAY: netem distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    /// PACKET_LOSS: loss percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}
