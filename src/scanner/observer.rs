use colored::Colorize;
use std::{io, net::SocketAddr};

/// Receives progress while a scan runs. Every method defaults to doing
/// nothing; the outcome of a scan never depends on the observer.
pub trait ScanObserver {
    /// A connection attempt to `target` is about to start.
    fn probing(&self, _target: SocketAddr) {}

    /// `target` accepted the connection.
    fn found(&self, _target: SocketAddr) {}

    /// `target` refused, timed out or was unreachable.
    fn closed(&self, _target: SocketAddr, _error: &io::Error) {}

    /// The process hit its open-file limit; `target` will be retried.
    fn exhausted(&self, _target: SocketAddr) {}
}

/// Observer that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ScanObserver for Silent {}

/// Prints every attempt to stdout unless greppable output was requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver {
    greppable: bool,
    accessible: bool,
}

impl ConsoleObserver {
    /// Creates a printer honouring the greppable and accessible modes.
    pub const fn new(greppable: bool, accessible: bool) -> Self {
        Self {
            greppable,
            accessible,
        }
    }
}

impl ScanObserver for ConsoleObserver {
    fn probing(&self, target: SocketAddr) {
        if !self.greppable {
            println!("Scanning ... {} on port {}", target.ip(), target.port());
        }
    }

    fn found(&self, target: SocketAddr) {
        if !self.greppable {
            if self.accessible {
                println!("Open {target}");
            } else {
                println!("Open {}", target.to_string().purple());
            }
        }
    }

    fn exhausted(&self, target: SocketAddr) {
        if !self.greppable {
            println!("Too many open files, waiting before retrying {target}");
        }
    }
}
