//! Core functionality for actual scanning behaviour.
//!
//! A scan enumerates the usable hosts of a network and tries a TCP
//! connection to one port on each of them. Hosts that accept are the result;
//! everything else (refused, timed out, unreachable) is just absent.
mod connector;
mod observer;

pub use connector::{is_resource_exhausted, Connector, TcpConnector};
pub use observer::{ConsoleObserver, ScanObserver, Silent};

use crate::address;
use crate::error::ScanError;
use futures::{future, stream, StreamExt};
use log::{debug, info};
use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZero,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time;

/// Port of the setup service a device exposes in DIY mode.
pub const DEFAULT_PORT: u16 = 8081;

/// How long a single connection attempt may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Networks with more usable hosts than this are refused.
pub const MAX_HOSTS: u64 = 255;

/// Hosts that accepted a connection, in the order they were tested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    found: Vec<Ipv4Addr>,
}

impl ScanResult {
    /// True when no host answered. This is a normal outcome.
    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    /// Reachable addresses in scan order.
    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.found
    }

    /// Reachable addresses paired with their 1-based ordinal.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Ipv4Addr)> + '_ {
        self.found.iter().copied().enumerate().map(|(i, ip)| (i + 1, ip))
    }

    /// Ordinal to dotted-decimal mapping, numbered from 1 without gaps.
    pub fn to_map(&self) -> BTreeMap<usize, String> {
        self.iter().map(|(n, ip)| (n, ip.to_string())).collect()
    }
}

impl FromIterator<Ipv4Addr> for ScanResult {
    fn from_iter<I: IntoIterator<Item = Ipv4Addr>>(iter: I) -> Self {
        Self {
            found: iter.into_iter().collect(),
        }
    }
}

/// The class for the scanner
/// port is the TCP port probed on every host.
/// timeout is how long to wait before declaring a host absent; it is also
/// the pause taken when the process runs out of file descriptors.
/// batch_size is how many hosts may be probed at the same time. 1 keeps the
/// scan strictly sequential; larger values still report hosts in
/// enumeration order.
#[derive(Debug)]
pub struct Scanner<C = TcpConnector, O = Silent> {
    port: u16,
    timeout: Duration,
    batch_size: NonZero<usize>,
    connector: C,
    observer: O,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    /// Builds a TCP scanner with no progress output.
    /// A `batch_size` of 0 is corrected to 1.
    pub fn new(port: u16, timeout: Duration, batch_size: usize) -> Self {
        Self {
            port,
            timeout,
            batch_size: NonZero::new(batch_size).unwrap_or(NonZero::<usize>::MIN),
            connector: TcpConnector,
            observer: Silent,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_TIMEOUT, 1)
    }
}

impl<C: Connector, O: ScanObserver> Scanner<C, O> {
    /// Replaces the way connections are attempted.
    pub fn with_connector<D: Connector>(self, connector: D) -> Scanner<D, O> {
        Scanner {
            port: self.port,
            timeout: self.timeout,
            batch_size: self.batch_size,
            connector,
            observer: self.observer,
            cancel: self.cancel,
        }
    }

    /// Reports progress to `observer`.
    pub fn with_observer<P: ScanObserver>(self, observer: P) -> Scanner<C, P> {
        Scanner {
            port: self.port,
            timeout: self.timeout,
            batch_size: self.batch_size,
            connector: self.connector,
            observer,
            cancel: self.cancel,
        }
    }

    /// Shares a stop flag with the caller. Once it is set no new host is
    /// probed and [`Scanner::run`] returns what was found so far.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// The port probed on every host.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The per-attempt timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Scans every usable host of `network` (`a.b.c.d/n`).
    ///
    /// Fails only when the network cannot be parsed or is larger than
    /// [`MAX_HOSTS`]; in both cases nothing is probed.
    pub async fn run(&self, network: &str) -> Result<ScanResult, ScanError> {
        let hosts = address::hosts(network)?;

        if hosts.count() > MAX_HOSTS {
            return Err(ScanError::RangeTooLarge {
                hosts: hosts.count(),
                limit: MAX_HOSTS,
            });
        }

        debug!(
            "Start scanning hosts. \nNetwork {}\nNumber of hosts {}\nPort {}\nBatch size {}",
            hosts.network(),
            hosts.count(),
            self.port,
            self.batch_size
        );

        let found = stream::iter(hosts.iter())
            .take_while(|_| future::ready(!self.is_cancelled()))
            .map(|ip| self.probe(ip))
            .buffered(self.batch_size.get())
            .filter_map(future::ready)
            .collect::<Vec<_>>()
            .await;

        debug!("Hosts found: {:?}", &found);
        Ok(ScanResult { found })
    }

    /// Probes one host until it answers, fails for good, or the scan is
    /// cancelled. Running out of file descriptors is not a failure: the
    /// attempt is repeated after a pause of one timeout.
    async fn probe(&self, ip: Ipv4Addr) -> Option<Ipv4Addr> {
        let target = SocketAddr::new(IpAddr::V4(ip), self.port);

        loop {
            self.observer.probing(target);
            match self.connector.connect(target, self.timeout).await {
                Ok(()) => {
                    self.observer.found(target);
                    return Some(ip);
                }
                Err(e) if is_resource_exhausted(&e) => {
                    info!(
                        "Too many open files while probing {}, retrying in {:?}",
                        target, self.timeout
                    );
                    self.observer.exhausted(target);
                    time::sleep(self.timeout).await;
                    if self.is_cancelled() {
                        return None;
                    }
                }
                Err(e) => {
                    debug!("{} is closed: {}", target, e);
                    self.observer.closed(target, &e);
                    return None;
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}
