use log::debug;
use std::{future::Future, io, net::SocketAddr, time::Duration};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};

/// Open-file limit errors by raw OS code (`ENFILE`, `EMFILE`).
#[cfg(unix)]
const RESOURCE_LIMIT_CODES: [i32; 2] = [23, 24];
/// `WSAEMFILE`
#[cfg(windows)]
const RESOURCE_LIMIT_CODES: [i32; 1] = [10024];
#[cfg(not(any(unix, windows)))]
const RESOURCE_LIMIT_CODES: [i32; 0] = [];

/// Opens a connection to a target, or explains why it could not.
///
/// The scanner only cares whether the connection was accepted, so a
/// successful attempt yields `()` and the implementation is expected to
/// have closed the connection already.
pub trait Connector {
    /// Attempts one connection, giving up after `timeout`.
    fn connect(
        &self,
        target: SocketAddr,
        timeout: Duration,
    ) -> impl Future<Output = io::Result<()>> + Send;
}

impl<C: Connector + Sync> Connector for &C {
    fn connect(
        &self,
        target: SocketAddr,
        timeout: Duration,
    ) -> impl Future<Output = io::Result<()>> + Send {
        (**self).connect(target, timeout)
    }
}

/// Plain TCP connect through tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    async fn connect(&self, target: SocketAddr, timeout: Duration) -> io::Result<()> {
        let mut tcp_stream = time::timeout(timeout, TcpStream::connect(target)).await??;

        debug!("Connection was successful, shutting down stream {}", &target);
        if let Err(e) = tcp_stream.shutdown().await {
            debug!("Shutdown stream error {}", &e);
        }
        Ok(())
    }
}

/// Whether `err` means this process ran out of file descriptors.
///
/// The raw OS code is checked first; the message is matched as a fallback
/// for errors that were rewrapped on the way up.
pub fn is_resource_exhausted(err: &io::Error) -> bool {
    if err
        .raw_os_error()
        .is_some_and(|code| RESOURCE_LIMIT_CODES.contains(&code))
    {
        return true;
    }

    err.to_string().to_lowercase().contains("too many open files")
}
