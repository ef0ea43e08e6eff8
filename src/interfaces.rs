// src/interfaces.rs
use std::net::IpAddr;

use crate::error::LookupError;
use crate::report::AddressEntry;

/// One address record as reported by the OS interface listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub up: bool,
    pub loopback: bool,
    /// `None` for link-layer or otherwise non-IP entries.
    pub addr: Option<IpAddr>,
}

#[derive(Debug, Clone)]
pub struct InterfaceFilter<'a> {
    pub include_bridge: bool,
    pub bridge_prefix: &'a str,
}

impl InterfaceFilter<'_> {
    fn keeps(&self, record: &InterfaceRecord) -> bool {
        if !record.up || record.loopback {
            return false;
        }
        self.include_bridge || !record.name.starts_with(self.bridge_prefix)
    }
}

/// Keeps IPv4 addresses of up, non-loopback interfaces.
///
/// The OS may interleave records of different interfaces (Linux reports all
/// link-layer entries first, then IPv4, then IPv6), so entries are grouped
/// by interface in the order each interface first appears.
pub fn select_entries<I>(records: I, filter: &InterfaceFilter<'_>) -> Vec<AddressEntry>
where
    I: IntoIterator<Item = InterfaceRecord>,
{
    let mut groups: Vec<(String, Vec<AddressEntry>)> = Vec::new();

    for record in records {
        let slot = match groups.iter().position(|(name, _)| *name == record.name) {
            Some(idx) => idx,
            None => {
                groups.push((record.name.clone(), Vec::new()));
                groups.len() - 1
            }
        };

        if !filter.keeps(&record) {
            continue;
        }
        let Some(IpAddr::V4(ip)) = record.addr else {
            continue;
        };

        groups[slot].1.push(AddressEntry {
            addr: ip.to_string(),
            interface: Some(record.name),
        });
    }

    groups.into_iter().flat_map(|(_, entries)| entries).collect()
}

#[cfg(unix)]
fn list_records() -> Result<Vec<InterfaceRecord>, LookupError> {
    use nix::net::if_::InterfaceFlags;
    use std::net::Ipv4Addr;

    let addrs = nix::ifaddrs::getifaddrs()
        .map_err(|errno| LookupError::Interfaces(std::io::Error::from(errno)))?;

    let records = addrs
        .map(|ifaddr| {
            let addr = ifaddr.address.as_ref().and_then(|address| {
                if let Some(sin) = address.as_sockaddr_in() {
                    Some(IpAddr::V4(Ipv4Addr::from(sin.ip())))
                } else {
                    address.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip()))
                }
            });
            InterfaceRecord {
                up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
                loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                name: ifaddr.interface_name,
                addr,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(not(unix))]
fn list_records() -> Result<Vec<InterfaceRecord>, LookupError> {
    Err(LookupError::Unsupported("interface listing"))
}

pub fn local_addresses(filter: &InterfaceFilter<'_>) -> Result<Vec<AddressEntry>, LookupError> {
    let records = list_records()?;
    tracing::debug!(count = records.len(), "listed interface addresses");
    Ok(select_entries(records, filter))
}
