// src/gateway.rs
use std::net::Ipv4Addr;

use crate::command;
use crate::config::GatewayConfig;
use crate::error::LookupError;

const RTF_UP: u32 = 0x0001;
const RTF_GATEWAY: u32 = 0x0002;

// Column positions in the kernel routing table.
const COL_DESTINATION: usize = 1;
const COL_GATEWAY: usize = 2;
const COL_FLAGS: usize = 3;
const COL_MASK: usize = 7;

/// A routing-table listing command and where its output puts the gateway.
#[derive(Debug, Clone, Copy)]
pub struct RouteCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub gateway_field: usize,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub const ROUTE_COMMAND: RouteCommand = RouteCommand {
    program: "ip",
    args: &["-4", "route", "show", "default"],
    gateway_field: 2,
};

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub const ROUTE_COMMAND: RouteCommand = RouteCommand {
    program: "netstat",
    args: &["-rn", "-f", "inet"],
    gateway_field: 1,
};

/// Decodes a kernel routing table (`/proc/net/route` layout) and returns the
/// gateway of the first usable default route.
///
/// Addresses are hex words in host byte order, e.g. `0101A8C0` is
/// 192.168.1.1 on a little-endian machine.
pub fn parse_route_table(table: &str) -> Result<Ipv4Addr, LookupError> {
    for (idx, line) in table.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || (idx == 0 && fields[0] == "Iface") {
            continue;
        }
        if fields.len() <= COL_MASK {
            return Err(LookupError::RouteDecode(format!(
                "line {}: expected at least {} fields, got {}",
                idx + 1,
                COL_MASK + 1,
                fields.len()
            )));
        }

        let destination = hex_word(&fields, COL_DESTINATION, idx)?;
        let mask = hex_word(&fields, COL_MASK, idx)?;
        let flags = hex_word(&fields, COL_FLAGS, idx)?;
        if destination != 0 || mask != 0 {
            continue;
        }
        if flags & RTF_UP == 0 || flags & RTF_GATEWAY == 0 {
            // Default route straight out of a device, e.g. a point-to-point link.
            continue;
        }

        let gateway = Ipv4Addr::from(hex_word(&fields, COL_GATEWAY, idx)?.to_ne_bytes());
        tracing::debug!(iface = fields[0], %gateway, "default route in routing table");
        return Ok(gateway);
    }

    Err(LookupError::NoDefaultGateway)
}

fn hex_word(fields: &[&str], col: usize, line_idx: usize) -> Result<u32, LookupError> {
    u32::from_str_radix(fields[col], 16).map_err(|e| {
        LookupError::RouteDecode(format!("line {}: bad hex field {:?}: {}", line_idx + 1, fields[col], e))
    })
}

/// Scans the text output of a routing command for the IPv4 default route.
///
/// Lines mentioning `::` are IPv6 rows and skipped. A default row whose
/// gateway column is not an IPv4 address (`link#4`, a device name) is
/// skipped too.
pub fn scan_route_listing(listing: &str, gateway_field: usize) -> Result<Ipv4Addr, LookupError> {
    listing
        .lines()
        .filter(|line| !line.contains("::"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if !fields.contains(&"default") {
                return None;
            }
            fields.get(gateway_field)?.parse::<Ipv4Addr>().ok()
        })
        .next()
        .ok_or(LookupError::NoDefaultGateway)
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
async fn from_command(route: &RouteCommand) -> Result<Ipv4Addr, LookupError> {
    let listing = command::run_listing(route.program, route.args).await?;
    scan_route_listing(&listing, route.gateway_field)
}

/// Finds the IPv4 default gateway.
///
/// On Linux the kernel routing table is read first; the `ip` command is
/// only used when the table cannot be opened (restricted `/proc`).
#[cfg(any(target_os = "linux", target_os = "android"))]
pub async fn resolve_gateway(config: &GatewayConfig) -> Result<Ipv4Addr, LookupError> {
    use std::io::ErrorKind;

    match tokio::fs::read_to_string(&config.route_table).await {
        Ok(table) => parse_route_table(&table),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            tracing::info!(
                path = %config.route_table.display(),
                error = %e,
                "routing table unavailable, falling back to {}",
                ROUTE_COMMAND.program
            );
            from_command(&ROUTE_COMMAND).await
        }
        Err(source) => Err(LookupError::RouteTable {
            path: config.route_table.display().to_string(),
            source,
        }),
    }
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub async fn resolve_gateway(_config: &GatewayConfig) -> Result<Ipv4Addr, LookupError> {
    from_command(&ROUTE_COMMAND).await
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
pub async fn resolve_gateway(_config: &GatewayConfig) -> Result<Ipv4Addr, LookupError> {
    Err(LookupError::Unsupported("default gateway discovery"))
}
