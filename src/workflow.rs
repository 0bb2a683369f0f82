//! The interactive session: main menu, device instructions, network choice,
//! scan, and back to the main menu.
use std::io::{self, BufRead, Write};

use crate::interface::LocalNetwork;
use crate::interrupt::Interrupt;
use crate::menu::Menu;
use crate::scanner::{Connector, ScanObserver, ScanResult, Scanner};

/// Where the session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Choosing what to do.
    MainMenu,
    /// Telling the user how to put the device in DIY mode.
    DeviceInstructions,
    /// Choosing which local network to scan.
    SelectNetwork,
    /// Scanning the given network (CIDR form).
    Scan(String),
    /// Done.
    Exit,
}

/// Lists the local networks the user can pick from.
pub type NetworkLister = fn() -> anyhow::Result<Vec<LocalNetwork>>;

/// Drives the interactive session over any line input and text output.
pub struct Workflow<'a, R, W, C, O> {
    input: R,
    out: W,
    scanner: &'a Scanner<C, O>,
    interrupt: Interrupt,
    networks: NetworkLister,
    greppable: bool,
}

impl<'a, R, W, C, O> Workflow<'a, R, W, C, O>
where
    R: BufRead,
    W: Write,
    C: Connector,
    O: ScanObserver,
{
    /// `scanner` should share `interrupt`'s cancel flag so Ctrl-C can stop
    /// a scan.
    pub fn new(
        input: R,
        out: W,
        scanner: &'a Scanner<C, O>,
        interrupt: Interrupt,
        networks: NetworkLister,
    ) -> Self {
        Self {
            input,
            out,
            scanner,
            interrupt,
            networks,
            greppable: false,
        }
    }

    /// Print results as bare addresses.
    #[must_use]
    pub const fn greppable(mut self, greppable: bool) -> Self {
        self.greppable = greppable;
        self
    }

    /// Runs the session until the user exits or the input ends.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut step = Step::MainMenu;
        while step != Step::Exit {
            step = self.step(step).await?;
        }
        Ok(())
    }

    /// Performs one step and says which one comes next.
    pub async fn step(&mut self, step: Step) -> anyhow::Result<Step> {
        let next = match step {
            Step::MainMenu => self.main_menu()?,
            Step::DeviceInstructions => self.device_instructions()?,
            Step::SelectNetwork => self.select_network()?,
            Step::Scan(network) => self.scan(&network).await?,
            Step::Exit => Step::Exit,
        };
        Ok(next)
    }

    fn main_menu(&mut self) -> io::Result<Step> {
        let menu = Menu::new("MAIN MENU:")
            .item(1, "Find a device in DIY mode on your network")
            .spaced_item(0, "Exit");

        Ok(match menu.choose(&mut self.input, &mut self.out)? {
            Some(1) => Step::DeviceInstructions,
            _ => Step::Exit,
        })
    }

    fn device_instructions(&mut self) -> io::Result<Step> {
        writeln!(self.out, "Please turn on your device.")?;
        writeln!(self.out, "Long press its button (>5sec).")?;
        writeln!(
            self.out,
            "It should blink rapidly and continuously (if not, long press again)."
        )?;

        let menu = Menu::new("FOLLOW INSTRUCTIONS")
            .item(1, "When device is ready, press (1)")
            .spaced_item(0, "Exit");

        Ok(match menu.choose(&mut self.input, &mut self.out)? {
            Some(1) => Step::SelectNetwork,
            _ => Step::Exit,
        })
    }

    fn select_network(&mut self) -> io::Result<Step> {
        let networks = match (self.networks)() {
            Ok(networks) => networks,
            Err(e) => {
                writeln!(self.out, "Error: {e:#}")?;
                return Ok(Step::MainMenu);
            }
        };

        if networks.is_empty() {
            writeln!(self.out, "No network interfaces")?;
            return Ok(Step::MainMenu);
        }

        let menu = networks
            .iter()
            .zip(1u32..)
            .fold(Menu::new("Choose your network interface:"), |menu, (network, idx)| {
                menu.item(idx, network.to_string())
            })
            .spaced_item(0, "Back");

        Ok(match menu.choose(&mut self.input, &mut self.out)? {
            None => Step::Exit,
            Some(0) => Step::MainMenu,
            Some(idx) => networks
                .get(idx as usize - 1)
                .map_or(Step::MainMenu, |network| Step::Scan(network.cidr())),
        })
    }

    async fn scan(&mut self, network: &str) -> io::Result<Step> {
        writeln!(
            self.out,
            "Scanning {} on port {}",
            network,
            self.scanner.port()
        )?;
        self.out.flush()?;

        self.interrupt.begin_scan();
        let result = self.scanner.run(network).await;
        self.interrupt.end_scan();

        match result {
            Ok(found) => write_report(
                &mut self.out,
                &found,
                self.interrupt.was_cancelled(),
                self.greppable,
            )?,
            Err(e) => writeln!(self.out, "Error: {e}")?,
        }
        Ok(Step::MainMenu)
    }
}

/// Prints the outcome of a finished scan, saying first when it was cut short.
pub fn write_report<W: Write>(
    out: &mut W,
    result: &ScanResult,
    cancelled: bool,
    greppable: bool,
) -> io::Result<()> {
    if cancelled && !greppable {
        writeln!(out, "Scan interrupted, showing what was found so far")?;
    }
    write_results(out, result, greppable)
}

/// Prints a scan result: `FOUND <address>` per host, `No device found` when
/// empty, or bare addresses in greppable mode.
pub fn write_results<W: Write>(
    out: &mut W,
    result: &ScanResult,
    greppable: bool,
) -> io::Result<()> {
    if greppable {
        for ip in result.addresses() {
            writeln!(out, "{ip}")?;
        }
        return Ok(());
    }

    if result.is_empty() {
        return writeln!(out, "No device found");
    }
    for (_, ip) in result.iter() {
        writeln!(out, "FOUND {ip}")?;
    }
    Ok(())
}
