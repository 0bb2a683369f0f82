//! Provides functions to turn a CIDR into the usable host addresses it covers.
//!
//! The walk is done over the raw octets: starting at the network address, a
//! big-endian increment with carry is applied until the network no longer
//! contains the address. Network and broadcast addresses are dropped unless
//! the block is a point-to-point `/31` or a single `/32`.
use std::iter::FusedIterator;
use std::net::Ipv4Addr;
use std::str::FromStr;

use cidr_utils::cidr::{Ipv4Cidr, Ipv4Inet};
use log::debug;

use crate::error::ScanError;

/// Usable hosts of an IPv4 network, in ascending order.
///
/// The count is known up front so callers can refuse a huge range without
/// walking it.
///
/// ```rust
/// # use diyscan::address::hosts;
/// let hosts = hosts("192.168.0.0/30").unwrap();
///
/// assert_eq!(hosts.count(), 2);
/// assert_eq!(hosts.to_strings(), ["192.168.0.1", "192.168.0.2"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hosts {
    network: Ipv4Cidr,
    total: u64,
}

impl Hosts {
    /// The network (host bits cleared) the addresses belong to.
    pub const fn network(&self) -> Ipv4Cidr {
        self.network
    }

    /// Number of addresses the iterator yields.
    pub const fn count(&self) -> u64 {
        if self.strips_edges() {
            self.total - 2
        } else {
            self.total
        }
    }

    /// Iterates the usable hosts in ascending order.
    pub fn iter(&self) -> HostIter {
        let first = self.network.first_address();
        let mut inner = NetworkWalk {
            network: self.network,
            start: first,
            next: Some(first),
        };
        if self.strips_edges() {
            inner.next();
        }

        HostIter {
            inner,
            remaining: self.count(),
        }
    }

    /// Dotted-decimal form of every usable host.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|ip| ip.to_string()).collect()
    }

    const fn strips_edges(&self) -> bool {
        self.total > 2
    }
}

impl IntoIterator for &Hosts {
    type Item = Ipv4Addr;
    type IntoIter = HostIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses `cidr` and describes the usable hosts it covers.
///
/// The address part may carry host bits (`192.168.1.42/24` is accepted, as
/// an interface address would be); they are masked off.
pub fn hosts(cidr: &str) -> Result<Hosts, ScanError> {
    let network = parse_network(cidr)?;
    let total = 1u64 << (32 - u32::from(network.network_length()));

    debug!("{} covers {} addresses", network, total);

    Ok(Hosts { network, total })
}

/// Parses `a.b.c.d/n` into the network it belongs to.
pub fn parse_network(cidr: &str) -> Result<Ipv4Cidr, ScanError> {
    let invalid = || ScanError::InvalidCidr(cidr.to_owned());
    let trimmed = cidr.trim();

    // A bare address would otherwise be read as a /32.
    if !trimmed.contains('/') {
        return Err(invalid());
    }

    Ipv4Inet::from_str(trimmed)
        .map(|inet| inet.network())
        .map_err(|_| invalid())
}

/// Big-endian increment with carry across all four octets.
///
/// `255.255.255.255` wraps around to `0.0.0.0`.
pub fn increment(ip: Ipv4Addr) -> Ipv4Addr {
    let mut octets = ip.octets();
    for octet in octets.iter_mut().rev() {
        *octet = octet.wrapping_add(1);
        if *octet > 0 {
            break;
        }
    }
    Ipv4Addr::from(octets)
}

/// Every address of the network, network and broadcast included.
#[derive(Debug, Clone)]
struct NetworkWalk {
    network: Ipv4Cidr,
    start: Ipv4Addr,
    next: Option<Ipv4Addr>,
}

impl Iterator for NetworkWalk {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.network.contains(&current) {
            return None;
        }

        let following = increment(current);
        // Wrapping back to the start means a /0 has been walked completely.
        if following != self.start {
            self.next = Some(following);
        }
        Some(current)
    }
}

/// Iterator returned by [`Hosts::iter`].
#[derive(Debug, Clone)]
pub struct HostIter {
    inner: NetworkWalk,
    remaining: u64,
}

impl Iterator for HostIter {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl FusedIterator for HostIter {}
