use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "portwarden",
    version,
    about = "Inventory open ports and reclaim them by safely terminating their owners"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List open sockets with their owning processes
    Ports(PortsArgs),
    /// Aggregate statistics over a fresh snapshot
    Stats(StatsArgs),
    /// Terminate the processes holding ports (SIGTERM, escalating to SIGKILL)
    Kill(KillArgs),
    /// Resolve a PID to its process name
    Inspect(InspectArgs),
    Version,
}

#[derive(Args, Debug)]
pub struct OutputOpts {
    /// Output format: table, json, yaml or csv
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Write the rendering to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PortsArgs {
    /// Only this port number
    #[arg(long)]
    pub port: Option<u16>,

    /// Only this protocol (tcp or udp)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Only processes whose name contains this, case-insensitive
    #[arg(long)]
    pub process: Option<String>,

    /// Only this connection state (LISTEN, ESTABLISHED, ...)
    #[arg(long)]
    pub state: Option<String>,

    #[command(flatten)]
    pub out: OutputOpts,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub out: OutputOpts,
}

#[derive(Args, Debug)]
pub struct KillArgs {
    /// Target process ids
    #[arg(required = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub pids: Vec<u32>,

    /// Send SIGKILL immediately instead of SIGTERM first
    #[arg(long)]
    pub force: bool,

    /// Port that motivated the kill, recorded in the audit trail
    #[arg(long)]
    pub port: Option<u16>,

    /// Wait after the first signal before escalating (e.g. "3s")
    #[arg(long, env = "PORTWARDEN_GRACE", default_value = "3s")]
    pub grace: String,

    /// Additional wait after the escalation SIGKILL
    #[arg(long, env = "PORTWARDEN_KILL_GRACE", default_value = "2s")]
    pub kill_grace: String,

    #[command(flatten)]
    pub out: OutputOpts,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Process id to resolve
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub pid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_parses_targets_and_flags() {
        let cli = Cli::try_parse_from(["portwarden", "kill", "123", "456", "--force"]).unwrap();
        match cli.cmd {
            Command::Kill(args) => {
                assert_eq!(args.pids, vec![123, 456]);
                assert!(args.force);
                assert_eq!(args.grace, "3s");
                assert_eq!(args.kill_grace, "2s");
            }
            _ => panic!("expected kill"),
        }
    }

    #[test]
    fn kill_rejects_pid_zero_and_no_targets() {
        assert!(Cli::try_parse_from(["portwarden", "kill", "0"]).is_err());
        assert!(Cli::try_parse_from(["portwarden", "kill"]).is_err());
    }

    #[test]
    fn ports_filters_are_optional() {
        let cli = Cli::try_parse_from([
            "portwarden", "ports", "--protocol", "tcp", "--state", "listen",
        ])
        .unwrap();
        match cli.cmd {
            Command::Ports(args) => {
                assert_eq!(args.port, None);
                assert_eq!(args.protocol.as_deref(), Some("tcp"));
                assert_eq!(args.state.as_deref(), Some("listen"));
                assert_eq!(args.out.format, "table");
            }
            _ => panic!("expected ports"),
        }
    }

    #[test]
    fn inspect_requires_a_positive_pid() {
        assert!(Cli::try_parse_from(["portwarden", "inspect", "0"]).is_err());
        assert!(Cli::try_parse_from(["portwarden", "inspect", "12"]).is_ok());
    }
}
