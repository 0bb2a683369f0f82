//! This crate exposes the internal functionality of diyscan, a finder for
//! ITEAD devices waiting in DIY mode on the local network.
//!
//! A device in DIY mode opens a small HTTP setup service on TCP port 8081.
//! diyscan takes the IPv4 network of one of your interfaces, lists the
//! usable hosts in it and tries a short TCP connection to that port on each
//! of them. Every host that accepts is reported.
//!
//! ## Architecture Overview
//!
//! 1. **Interface listing**: [`interface::local_networks`] lists the IPv4
//!    networks this machine is attached to
//! 2. **Host enumeration**: [`address::hosts`] turns a CIDR into the usable
//!    host addresses, network and broadcast excluded
//! 3. **Probing**: [`scanner::Scanner`] connects to each host with a timeout,
//!    backing off when the process runs out of file descriptors
//! 4. **Workflow**: [`workflow::Workflow`] strings the steps together behind
//!    numbered [`menu::Menu`]s
//!
//! ## Basic Usage Example
//!
//! ```rust
//! use diyscan::scanner::{Scanner, DEFAULT_PORT};
//! use std::time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let scanner = Scanner::new(DEFAULT_PORT, Duration::from_millis(100), 1);
//!
//! let found = scanner.run("127.0.0.1/32").await.unwrap();
//! for (n, ip) in found.iter() {
//!     println!("{n}) FOUND {ip}");
//! }
//! # });
//! ```
//!
//! ## Error Handling
//!
//! Only two things stop a scan: a network that cannot be parsed and a
//! network larger than [`scanner::MAX_HOSTS`] usable hosts. Refused, timed
//! out and unreachable hosts are simply absent from the result.
#![warn(missing_docs)]

pub mod tui;

pub mod input;

pub mod address;

pub mod error;

pub mod scanner;

pub mod interface;

pub mod interrupt;

pub mod menu;

pub mod workflow;
