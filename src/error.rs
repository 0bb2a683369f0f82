//! Errors that stop an enumeration or a scan.
//!
//! Per-address connection failures are never represented here: a host that
//! refuses, times out or is unreachable is simply absent from the result.
use thiserror::Error;

/// The only failures a scan can report to its caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The network string is not of the form `a.b.c.d/n`.
    #[error("invalid CIDR '{0}', expected something like 192.168.1.0/24")]
    InvalidCidr(String),

    /// The network holds more usable hosts than a scan is allowed to visit.
    #[error("too many ip addresses: {hosts} (at most {limit} can be scanned)")]
    RangeTooLarge {
        /// Usable hosts in the requested network.
        hosts: u64,
        /// The cap that was exceeded.
        limit: u64,
    },
}
