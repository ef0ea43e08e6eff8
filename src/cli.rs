use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "ipinfo")]
#[command(version, about = "Simple tool to get your IP addresses", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Show local non-loopback IPv4 addresses
    #[arg(short, long)]
    pub local: bool,

    /// Show gateway IP
    #[arg(short, long)]
    pub gateway: bool,

    /// Show external IP address
    #[arg(short, long)]
    pub external: bool,

    /// When combined with -l, shows all interfaces including bridges
    #[arg(short, long)]
    pub all: bool,

    /// Don't show headers (for scripting)
    #[arg(short, long)]
    pub no_headers: bool,

    /// Include bridge interfaces in local IPs
    #[arg(short = 'b', long)]
    pub show_bridge: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Alternate configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// What to look up and how to print it, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub local: bool,
    pub gateway: bool,
    pub external: bool,
    pub include_bridge: bool,
    pub pretty: bool,
    pub json: bool,
}

impl Cli {
    pub fn plan(&self) -> Plan {
        let show_all = !self.local && !self.gateway && !self.external;
        Plan {
            local: self.local || show_all,
            gateway: self.gateway || show_all,
            external: self.external || show_all,
            include_bridge: show_all || self.show_bridge || (self.local && self.all),
            pretty: show_all && !self.no_headers,
            json: self.json,
        }
    }
}
