//! Provides a means to read, parse and hold configuration options for scans.
use anyhow::Context;
use clap::Parser;
use serde_derive::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::DEFAULT_PORT;

const DEFAULT_TIMEOUT_MS: &str = "500";
const CONFIG_FILE_NAME: &str = ".diyscan.toml";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "diyscan",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
#[allow(clippy::struct_excessive_bools)]
/// Finds ITEAD devices in DIY mode on your local network.
/// Without --network an interactive menu walks you through picking one of
/// your network interfaces.
pub struct Opts {
    /// The network to scan in CIDR form, e.g. 192.168.1.0/24. Skips the menus.
    #[arg(short, long)]
    pub network: Option<String>,

    /// The TCP port the device's setup service listens on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The timeout in milliseconds before a host is assumed to be absent.
    #[arg(short, long, default_value = DEFAULT_TIMEOUT_MS)]
    pub timeout: u32,

    /// How many hosts to probe at the same time. 1 scans one host after
    /// the other. Depends on the open file limit of your OS.
    #[arg(short, long, default_value = "1")]
    pub batch_size: u16,

    /// Automatically ups the ULIMIT with the value you provided.
    #[arg(short, long)]
    pub ulimit: Option<u64>,

    /// Greppable mode. Only output the addresses found, one per line.
    #[arg(short, long)]
    pub greppable: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Whether to ignore the configuration file or not.
    #[arg(long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,
}

#[cfg(not(tarpaulin_include))]
impl Opts {
    /// Parses the process arguments.
    pub fn read() -> Self {
        Self::parse()
    }

    /// Merges values found within the user configuration file, unless the
    /// configuration file is ignored.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_required(config);
            self.merge_optional(config);
        }
    }

    fn merge_required(&mut self, config: &Config) {
        macro_rules! merge_required {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_required!(port, timeout, batch_size, greppable, accessible);
    }

    fn merge_optional(&mut self, config: &Config) {
        macro_rules! merge_optional {
            ($($field: ident),+) => {
                $(
                    // Values given on the command line win.
                    if self.$field.is_none() {
                        self.$field = config.$field.clone();
                    }
                )+
            }
        }

        merge_optional!(network, ulimit);
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            network: None,
            port: DEFAULT_PORT,
            timeout: 500,
            batch_size: 1,
            ulimit: None,
            greppable: false,
            accessible: false,
            no_banner: false,
            no_config: true,
            config_path: None,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    network: Option<String>,
    port: Option<u16>,
    timeout: Option<u32>,
    batch_size: Option<u16>,
    ulimit: Option<u64>,
    greppable: Option<bool>,
    accessible: Option<bool>,
}

impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing file is an empty configuration.
    ///
    /// # Format
    ///
    /// network = "192.168.1.0/24"
    /// port = 8081
    /// timeout = 500
    /// batch_size = 1
    /// greppable = false
    /// accessible = false
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(config_path) = custom_config_path.or_else(default_config_path) else {
            return Ok(Self::default());
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Found an error in configuration file {}", path.display()))
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(CONFIG_FILE_NAME);
    Some(config_path)
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use parameterized::parameterized;
    use std::io::Write;

    use super::{Config, Opts};

    fn sample_config() -> Config {
        Config {
            network: Some("10.0.0.0/24".to_owned()),
            port: Some(80),
            timeout: Some(1_000),
            batch_size: Some(16),
            ulimit: Some(4_096),
            greppable: Some(true),
            accessible: Some(true),
        }
    }

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_device() {
        let opts = Opts::parse_from(["diyscan"]);

        assert_eq!(opts.port, 8081);
        assert_eq!(opts.timeout, 500);
        assert_eq!(opts.batch_size, 1);
        assert!(opts.network.is_none());
    }

    #[parameterized(input = {
        vec!["diyscan", "--network", "192.168.1.0/24"],
        vec!["diyscan", "-n", "192.168.1.0/24", "-p", "80"],
        vec!["diyscan", "-n", "192.168.1.0/24", "-t", "1500", "-b", "32"],
    }, expected = {
        (8081, 500, 1),
        (80, 500, 1),
        (8081, 1500, 32),
    })]
    fn parse_network_options(input: Vec<&str>, expected: (u16, u32, u16)) {
        let opts = Opts::parse_from(input);

        assert_eq!(opts.network.as_deref(), Some("192.168.1.0/24"));
        assert_eq!((opts.port, opts.timeout, opts.batch_size), expected);
    }

    #[test]
    fn opts_no_merge_when_config_is_ignored() {
        let mut opts = Opts::default();
        opts.merge(&sample_config());

        assert_eq!(opts.port, 8081);
        assert_eq!(opts.timeout, 500);
        assert!(opts.network.is_none());
        assert!(!opts.greppable);
    }

    #[test]
    fn opts_merge_required_arguments() {
        let mut opts = Opts::default();
        let config = sample_config();

        opts.merge_required(&config);

        assert_eq!(opts.port, 80);
        assert_eq!(opts.timeout, 1_000);
        assert_eq!(opts.batch_size, 16);
        assert!(opts.greppable);
        assert!(opts.accessible);
    }

    #[test]
    fn opts_merge_optional_arguments() {
        let mut opts = Opts::default();
        let config = sample_config();

        opts.merge_optional(&config);

        assert_eq!(opts.network.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(opts.ulimit, Some(4_096));
    }

    #[test]
    fn command_line_network_wins_over_config() {
        let mut opts = Opts {
            network: Some("172.16.0.0/28".to_owned()),
            no_config: false,
            ..Opts::default()
        };

        opts.merge(&sample_config());

        assert_eq!(opts.network.as_deref(), Some("172.16.0.0/28"));
    }

    #[test]
    fn config_is_read_from_custom_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"192.168.8.0/24\"\nport = 8080\ntimeout = 250").unwrap();

        let config = Config::read(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.network.as_deref(), Some("192.168.8.0/24"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.timeout, Some(250));
        assert_eq!(config.batch_size, None);
    }

    #[test]
    fn missing_config_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read(Some(dir.path().join("absent.toml"))).unwrap();

        assert!(config.network.is_none());
        assert!(config.port.is_none());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        assert!(Config::read(Some(file.path().to_path_buf())).is_err());
    }
}
