//! Lists the IPv4 networks this machine is attached to.
use std::fmt;
use std::net::Ipv4Addr;

use anyhow::Context;
use log::debug;
use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};

/// One IPv4 address of a local interface, with the network it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNetwork {
    /// Interface name as the OS reports it (`eth0`, `en0`, `Wi-Fi`...).
    pub name: String,
    /// The interface's own address.
    pub address: Ipv4Addr,
    /// Prefix length derived from the netmask.
    pub prefix: u8,
}

impl LocalNetwork {
    /// Builds an entry from an address and its netmask. A missing netmask
    /// is treated as a single host.
    pub fn new(name: impl Into<String>, address: Ipv4Addr, netmask: Option<Ipv4Addr>) -> Self {
        let prefix = netmask.map_or(32, prefix_len);
        Self {
            name: name.into(),
            address,
            prefix,
        }
    }

    /// `a.b.c.d/n` form, ready for [`crate::address::hosts`].
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix)
    }
}

impl fmt::Display for LocalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:  {}", self.name, self.cidr())
    }
}

/// Every IPv4 address of every local interface, in the order the OS lists
/// them.
pub fn local_networks() -> anyhow::Result<Vec<LocalNetwork>> {
    let interfaces =
        NetworkInterface::show().context("Could not list the network interfaces")?;

    Ok(interfaces
        .iter()
        .flat_map(|interface| {
            interface
                .addr
                .iter()
                .filter_map(|addr| ipv4_network(&interface.name, addr))
        })
        .collect())
}

fn ipv4_network(name: &str, addr: &Addr) -> Option<LocalNetwork> {
    let Addr::V4(v4) = addr else {
        return None;
    };
    debug!("Found IPv4 interface: {} ({}/{:?})", name, v4.ip, v4.netmask);
    Some(LocalNetwork::new(name, v4.ip, v4.netmask))
}

/// Counts the leading one bits of a netmask.
fn prefix_len(netmask: Ipv4Addr) -> u8 {
    // A u32 has at most 32 leading ones, which always fits.
    u8::try_from(u32::from(netmask).leading_ones()).unwrap_or(32)
}
