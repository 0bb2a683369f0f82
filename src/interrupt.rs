//! Ctrl-C handling.
//!
//! While a scan runs, Ctrl-C stops it and the hosts found so far are still
//! reported. Anywhere else (a menu waiting for input) Ctrl-C ends the
//! program as usual.
use log::info;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::task::JoinHandle;

/// Exit status used when the user interrupts outside of a scan.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared between the Ctrl-C listener and whoever runs scans.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancel: Arc<AtomicBool>,
    scanning: Arc<AtomicBool>,
}

impl Interrupt {
    /// No scan running, nothing cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// The flag to hand to [`crate::scanner::Scanner::with_cancel`].
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Marks the start of a scan and clears any earlier cancellation.
    pub fn begin_scan(&self) {
        self.cancel.store(false, Ordering::SeqCst);
        self.scanning.store(true, Ordering::SeqCst);
    }

    /// Marks the end of a scan.
    pub fn end_scan(&self) {
        self.scanning.store(false, Ordering::SeqCst);
    }

    /// Whether the last scan was stopped by the user.
    pub fn was_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Handles one Ctrl-C. Returns `false` when no scan was running and the
    /// program should exit.
    pub fn interrupt(&self) -> bool {
        if self.scanning.load(Ordering::SeqCst) {
            self.cancel.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Spawns the task listening for Ctrl-C. Needs a running tokio runtime.
    pub fn listen(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if interrupt.interrupt() {
                    info!("Interrupt received, stopping the scan");
                } else {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Interrupt;
    use std::sync::atomic::Ordering;

    #[test]
    fn interrupt_outside_scan_asks_to_exit() {
        let interrupt = Interrupt::new();

        assert!(!interrupt.interrupt());
        assert!(!interrupt.was_cancelled());
    }

    #[test]
    fn interrupt_during_scan_sets_the_flag() {
        let interrupt = Interrupt::new();
        let flag = interrupt.cancel_flag();

        interrupt.begin_scan();
        assert!(interrupt.interrupt());

        assert!(flag.load(Ordering::SeqCst));
        assert!(interrupt.was_cancelled());
    }

    #[test]
    fn new_scan_clears_previous_cancellation() {
        let interrupt = Interrupt::new();
        interrupt.begin_scan();
        interrupt.interrupt();
        interrupt.end_scan();

        interrupt.begin_scan();

        assert!(!interrupt.was_cancelled());
        interrupt.end_scan();
        assert!(!interrupt.interrupt());
    }
}
