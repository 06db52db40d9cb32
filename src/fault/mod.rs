//! Fault module for the saboteur agent
//!
//! Turns declarative fault requests into host-level network impairments:
//! - Network failure (iptables DROP)
//! - Service failure (iptables REJECT with TCP reset)
//! - Firewall timeout (conntrack ageing)
//! - Delay (tc netem)
//! - Packet loss (tc netem)

mod commands;
mod types;
mod validation;

pub use commands::{delay_netem, loss_netem, CommandBuilder, RuleOp, DEFAULT_LOSS_PROBABILITY};
pub use types::*;
pub use validation::{allowed_types_message, fault_type_of, validate, ValidationErrors};

pub mod messages {
    //! Validation messages reported per field
    pub use super::validation::{
        EMPTY_STR, EXPECTED_FLOAT, EXPECTED_INT, EXPECTED_STR, EXTRA_KEY, REQUIRED, UNSAFE_STR,
    };
}
