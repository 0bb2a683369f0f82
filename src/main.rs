#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::if_not_else, clippy::non_ascii_literal)]

use diyscan::input::{Config, Opts};
use diyscan::interface::local_networks;
use diyscan::interrupt::Interrupt;
use diyscan::scanner::{ConsoleObserver, Scanner};
use diyscan::workflow::{write_report, Workflow};
use diyscan::{detail, opening, warning};

use std::io::{self, Write};
use std::time::Duration;

#[macro_use]
extern crate log;

#[cfg(unix)]
const DEFAULT_FILE_DESCRIPTORS_LIMIT: u64 = 8000;

#[cfg(not(tarpaulin_include))]
/// Finds ITEAD devices in DIY mode on your network.
/// If you're looking for the actual scanning, check out the module Scanner
fn main() {
    #[cfg(not(unix))]
    let _ = ansi_term::enable_ansi_support();

    env_logger::init();

    let mut opts: Opts = Opts::read();
    let config = match Config::read(opts.config_path.clone()) {
        Ok(config) => config,
        Err(e) => {
            println!("{e:#}\nAborting scan.\n");
            std::process::exit(1);
        }
    };
    opts.merge(&config);

    debug!("Main() `opts` arguments are {:?}", opts);

    if !opts.greppable && !opts.accessible && !opts.no_banner {
        opening!();
    }

    #[cfg(unix)]
    let batch_size = infer_batch_size(&opts, adjust_ulimit_size(&opts));

    #[cfg(not(unix))]
    let batch_size = usize::from(opts.batch_size);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            warning!(format!("Could not start the async runtime: {e}"));
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(&opts, batch_size)) {
        // Failures reach stderr even in greppable mode.
        let _ = write_failure(&mut io::stderr(), &e, opts.accessible);
        std::process::exit(1);
    }
}

#[cfg(not(tarpaulin_include))]
async fn run(opts: &Opts, batch_size: usize) -> anyhow::Result<()> {
    let interrupt = Interrupt::new();
    interrupt.listen();

    let scanner = Scanner::new(
        opts.port,
        Duration::from_millis(opts.timeout.into()),
        batch_size,
    )
    .with_observer(ConsoleObserver::new(opts.greppable, opts.accessible))
    .with_cancel(interrupt.cancel_flag());

    debug!("Scanner finished building: {:?}", scanner);

    let Some(network) = &opts.network else {
        let stdin = io::stdin();
        return Workflow::new(
            stdin.lock(),
            io::stdout(),
            &scanner,
            interrupt,
            local_networks,
        )
        .greppable(opts.greppable)
        .run()
        .await;
    };

    detail!(
        format!(
            "Scanning {network} on port {} with a {:?} timeout",
            scanner.port(),
            scanner.timeout()
        ),
        opts.greppable,
        opts.accessible
    );

    interrupt.begin_scan();
    let result = scanner.run(network).await;
    interrupt.end_scan();
    let found = result?;

    write_report(
        &mut io::stdout(),
        &found,
        interrupt.was_cancelled(),
        opts.greppable,
    )?;
    Ok(())
}

fn write_failure<W: Write>(out: &mut W, e: &anyhow::Error, accessible: bool) -> io::Result<()> {
    if accessible {
        writeln!(out, "{e:#}")
    } else {
        writeln!(out, "{} {e:#}", ansi_term::Colour::Red.bold().paint("[!]"))
    }
}

#[cfg(unix)]
fn adjust_ulimit_size(opts: &Opts) -> u64 {
    use rlimit::Resource;

    if let Some(limit) = opts.ulimit {
        if Resource::NOFILE.set(limit, limit).is_ok() {
            detail!(
                format!("Automatically increasing ulimit value to {limit}."),
                opts.greppable,
                opts.accessible
            );
        } else {
            warning!(
                "ERROR. Failed to set ulimit value.",
                opts.greppable,
                opts.accessible
            );
        }
    }

    Resource::NOFILE
        .get()
        .map_or(DEFAULT_FILE_DESCRIPTORS_LIMIT, |(soft, _)| soft)
}

#[cfg(unix)]
fn infer_batch_size(opts: &Opts, ulimit: u64) -> usize {
    let mut batch_size: u64 = opts.batch_size.into();

    // Leave room below the file limit for stdin/stdout and the runtime.
    if ulimit <= batch_size {
        warning!(
            "File limit is lower than the batch size. Consider upping with --ulimit.",
            opts.greppable,
            opts.accessible
        );
        info!("Halving batch_size because ulimit is smaller than the batch size");
        batch_size = (ulimit / 2).max(1);
    }

    usize::try_from(batch_size).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    use super::infer_batch_size;
    use super::write_failure;
    use diyscan::error::ScanError;
    use diyscan::input::Opts;

    #[test]
    fn scan_failure_is_written_out() {
        let e = anyhow::Error::from(ScanError::RangeTooLarge {
            hosts: 510,
            limit: 255,
        });
        let mut out = Vec::new();
        write_failure(&mut out, &e, true).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "too many ip addresses: 510 (at most 255 can be scanned)\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_lowered() {
        let opts = Opts {
            batch_size: 50_000,
            ..Opts::default()
        };
        let batch_size = infer_batch_size(&opts, 120);

        assert_eq!(batch_size, 60);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_equals_ulimit_lowered() {
        let opts = Opts {
            batch_size: 256,
            ..Opts::default()
        };
        let batch_size = infer_batch_size(&opts, 256);

        assert_eq!(batch_size, 128);
    }

    #[test]
    #[cfg(unix)]
    fn batch_size_kept_below_ulimit() {
        let opts = Opts {
            batch_size: 32,
            ..Opts::default()
        };
        let batch_size = infer_batch_size(&opts, 1024);

        assert_eq!(batch_size, 32);
    }

    #[test]
    #[cfg(unix)]
    fn tiny_ulimit_still_scans() {
        let opts = Opts::default();
        let batch_size = infer_batch_size(&opts, 1);

        assert_eq!(batch_size, 1);
    }
}
