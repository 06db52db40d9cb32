//! Shell command builders
//!
//! Pure translation from validated faults to the ordered `iptables`, `tc`
//! and `/proc` commands that install them, plus the reset sequence.

use super::types::*;

pub const CONNTRACK_LOOSE: &str = "/proc/sys/net/netfilter/nf_conntrack_tcp_loose";
pub const CONNTRACK_ESTABLISHED_TIMEOUT: &str =
    "/proc/sys/net/netfilter/nf_conntrack_tcp_timeout_established";

const CONNTRACK_MATCH: &str = "-m conntrack --ctstate NEW,ESTABLISHED";
const REJECT_WITH_RESET: &str = "REJECT --reject-with tcp-reset";

/// iptables rule operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOp {
    Add,
    Delete,
}

impl RuleOp {
    fn flag(&self) -> &'static str {
        match self {
            RuleOp::Add => "-A",
            RuleOp::Delete => "-D",
        }
    }
}

/// Builds command strings against configurable `iptables` and `tc` invocations
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    iptables: String,
    tc: String,
}

impl CommandBuilder {
    pub fn new(iptables: impl Into<String>, tc: impl Into<String>) -> Self {
        Self {
            iptables: iptables.into(),
            tc: tc.into(),
        }
    }

    /// `<iptables> <-A|-D> <chain> -p <protocol> -j <action> [-s from] [-d to] [--dport port]`
    pub fn iptables_rule(&self, op: RuleOp, target: &FaultTarget, action: &str) -> String {
        let mut rule = format!(
            "{} {} {} -p {} -j {}",
            self.iptables,
            op.flag(),
            target.direction.chain(),
            target.protocol,
            action
        );
        if let Some(from) = &target.from {
            rule.push_str(&format!(" -s {}", from));
        }
        if let Some(to) = &target.to {
            rule.push_str(&format!(" -d {}", to));
        }
        rule.push_str(&format!(" --dport {}", target.to_port));
        rule
    }

    /// Commands installing `fault`, in execution order.
    ///
    /// `interfaces` is only consulted by the tc-based faults.
    pub fn fault_commands(&self, fault: &Fault, interfaces: &[String]) -> Vec<String> {
        let target = &fault.target;
        match &fault.kind {
            FaultKind::NetworkFailure => vec![self.iptables_rule(RuleOp::Add, target, "DROP")],
            FaultKind::ServiceFailure => {
                vec![self.iptables_rule(RuleOp::Add, target, REJECT_WITH_RESET)]
            }
            FaultKind::FirewallTimeout { timeout } => self.firewall_timeout(target, *timeout),
            FaultKind::Delay(params) => self.netem(target, &delay_netem(params), interfaces),
            FaultKind::PacketLoss(params) => self.netem(target, &loss_netem(params), interfaces),
        }
    }

    /// Commands removing every installed fault
    pub fn reset_commands(&self, interfaces: &[String]) -> Vec<String> {
        let mut commands = vec![format!("{} -F", self.iptables)];
        commands.extend(
            interfaces
                .iter()
                .map(|iface| format!("{} qdisc del dev {} root", self.tc, iface)),
        );
        commands
    }

    fn firewall_timeout(&self, target: &FaultTarget, timeout: i64) -> Vec<String> {
        vec![
            format!(
                "{} {}",
                self.iptables_rule(RuleOp::Add, target, "ACCEPT"),
                CONNTRACK_MATCH
            ),
            self.iptables_rule(RuleOp::Add, target, "DROP"),
            format!("echo 0 | sudo tee {}", CONNTRACK_LOOSE),
            format!("echo {} | sudo tee {}", timeout, CONNTRACK_ESTABLISHED_TIMEOUT),
        ]
    }

    fn netem(&self, target: &FaultTarget, netem: &str, interfaces: &[String]) -> Vec<String> {
        interfaces
            .iter()
            .flat_map(|iface| {
                [
                    format!("{} qdisc add dev {} root handle 1: prio", self.tc, iface),
                    format!(
                        "{} qdisc add dev {} parent 1:3 handle 11: {}",
                        self.tc, iface, netem
                    ),
                    format!(
                        "{} filter add dev {} protocol ip parent 1:0 prio 3 u32 match ip {} {} 0xffff flowid 1:3",
                        self.tc,
                        iface,
                        target.direction.port_match(),
                        target.to_port
                    ),
                ]
            })
            .collect()
    }
}

/// netem fragment for a delay fault. A distribution takes precedence over a
/// correlation; the correlation is then left out.
pub fn delay_netem(params: &DelayParams) -> String {
    let mut netem = format!("netem delay {}ms", params.delay);
    if let Some(variance) = params.variance {
        netem.push_str(&format!(" {}ms", variance));
    }
    if let Some(distribution) = &params.distribution {
        netem.push_str(&format!(" distribution {}", distribution));
    } else if let Some(correlation) = params.correlation {
        netem.push_str(&format!(" {}%", correlation));
    }
    netem
}

/// Loss percentage used when a packet loss fault gives none
pub const DEFAULT_LOSS_PROBABILITY: f64 = 100.0;

/// netem fragment for a packet loss fault
pub fn loss_netem(params: &PacketLossParams) -> String {
    let probability = params.probability.unwrap_or(DEFAULT_LOSS_PROBABILITY);
    let mut netem = format!("netem loss {}%", probability);
    if let Some(correlation) = params.correlation {
        netem.push_str(&format!(" {}%", correlation));
    }
    netem
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new("sudo /sbin/iptables", "sudo /sbin/tc")
    }

    fn target(direction: Direction, to_port: i64) -> FaultTarget {
        FaultTarget {
            name: "test".to_string(),
            direction,
            to_port,
            from: None,
            to: None,
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }

    fn interfaces() -> Vec<String> {
        vec!["eth0".to_string(), "vmnet8".to_string()]
    }

    #[test]
    fn test_network_failure() {
        let fault = Fault {
            target: target(Direction::In, 80),
            kind: FaultKind::NetworkFailure,
        };
        assert_eq!(
            builder().fault_commands(&fault, &[]),
            vec!["sudo /sbin/iptables -A INPUT -p TCP -j DROP --dport 80"]
        );
    }

    #[test]
    fn test_service_failure_with_hosts() {
        let mut t = target(Direction::Out, 8080);
        t.from = Some("10.0.0.1".to_string());
        t.to = Some("10.0.0.2".to_string());
        t.protocol = "UDP".to_string();
        let fault = Fault {
            target: t,
            kind: FaultKind::ServiceFailure,
        };
        assert_eq!(
            builder().fault_commands(&fault, &interfaces()),
            vec![
                "sudo /sbin/iptables -A OUTPUT -p UDP -j REJECT --reject-with tcp-reset -s 10.0.0.1 -d 10.0.0.2 --dport 8080"
            ]
        );
    }

    #[test]
    fn test_delete_rule() {
        let rule = builder().iptables_rule(RuleOp::Delete, &target(Direction::In, 22), "DROP");
        assert_eq!(rule, "sudo /sbin/iptables -D INPUT -p TCP -j DROP --dport 22");
    }

    #[test]
    fn test_firewall_timeout_sequence() {
        let fault = Fault {
            target: target(Direction::In, 5432),
            kind: FaultKind::FirewallTimeout { timeout: 30 },
        };
        let commands = builder().fault_commands(&fault, &interfaces());
        assert_eq!(
            commands,
            vec![
                "sudo /sbin/iptables -A INPUT -p TCP -j ACCEPT --dport 5432 -m conntrack --ctstate NEW,ESTABLISHED",
                "sudo /sbin/iptables -A INPUT -p TCP -j DROP --dport 5432",
                "echo 0 | sudo tee /proc/sys/net/netfilter/nf_conntrack_tcp_loose",
                "echo 30 | sudo tee /proc/sys/net/netfilter/nf_conntrack_tcp_timeout_established",
            ]
        );
    }

    #[test]
    fn test_delay_per_interface() {
        let fault = Fault {
            target: target(Direction::In, 4411),
            kind: FaultKind::Delay(DelayParams {
                delay: 160,
                variance: Some(12),
                correlation: None,
                distribution: Some("normal".to_string()),
                probability: None,
            }),
        };
        let commands = builder().fault_commands(&fault, &interfaces());
        assert_eq!(commands.len(), 6);
        assert_eq!(
            &commands[..3],
            &[
                "sudo /sbin/tc qdisc add dev eth0 root handle 1: prio",
                "sudo /sbin/tc qdisc add dev eth0 parent 1:3 handle 11: netem delay 160ms 12ms distribution normal",
                "sudo /sbin/tc filter add dev eth0 protocol ip parent 1:0 prio 3 u32 match ip sport 4411 0xffff flowid 1:3",
            ]
        );
        assert!(commands[3..].iter().all(|c| c.contains("dev vmnet8 ")));
    }

    #[test]
    fn test_packet_loss_outbound_uses_dport() {
        let fault = Fault {
            target: target(Direction::Out, 9000),
            kind: FaultKind::PacketLoss(PacketLossParams {
                probability: Some(0.3),
                correlation: Some(75),
            }),
        };
        let commands = builder().fault_commands(&fault, &interfaces());
        assert_eq!(commands.len(), 6);
        assert_eq!(
            commands[1],
            "sudo /sbin/tc qdisc add dev eth0 parent 1:3 handle 11: netem loss 0.3% 75%"
        );
        assert!(commands[2].contains("match ip dport 9000 0xffff"));
    }

    #[test]
    fn test_tc_faults_without_interfaces() {
        let fault = Fault {
            target: target(Direction::Out, 9000),
            kind: FaultKind::PacketLoss(PacketLossParams {
                probability: Some(5.0),
                correlation: None,
            }),
        };
        assert!(builder().fault_commands(&fault, &[]).is_empty());
    }

    #[test]
    fn test_delay_netem_variants() {
        let mut params = DelayParams {
            delay: 100,
            variance: None,
            correlation: Some(25),
            distribution: None,
            probability: None,
        };
        assert_eq!(delay_netem(&params), "netem delay 100ms 25%");

        params.variance = Some(10);
        assert_eq!(delay_netem(&params), "netem delay 100ms 10ms 25%");

        params.distribution = Some("pareto".to_string());
        assert_eq!(delay_netem(&params), "netem delay 100ms 10ms distribution pareto");

        params.correlation = None;
        params.distribution = None;
        params.variance = None;
        assert_eq!(delay_netem(&params), "netem delay 100ms");
    }

    #[test]
    fn test_reset_commands() {
        assert_eq!(
            builder().reset_commands(&interfaces()),
            vec![
                "sudo /sbin/iptables -F",
                "sudo /sbin/tc qdisc del dev eth0 root",
                "sudo /sbin/tc qdisc del dev vmnet8 root",
            ]
        );
        assert_eq!(builder().reset_commands(&[]), vec!["sudo /sbin/iptables -F"]);
    }
}
