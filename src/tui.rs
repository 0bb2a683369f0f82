//! Utilities for terminal output during scanning.

/// Terminal User Interface Module for diyscan
/// Defines macros to use
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
    };
    ($name:expr, $greppable:expr, $accessible:expr) => {
        // if not greppable then print, otherwise no else statement so do not print.
        if !$greppable {
            if $accessible {
                // Don't print the decoration
                println!("{}", $name);
            } else {
                println!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
            }
        }
    };
}

/// Prints an informational detail.
#[macro_export]
macro_rules! detail {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
    };
    ($name:expr, $greppable:expr, $accessible:expr) => {
        if !$greppable {
            if $accessible {
                println!("{}", $name);
            } else {
                println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
            }
        }
    };
}

/// Prints the opening banner.
#[macro_export]
macro_rules! opening {
    () => {
        use colored::Colorize;

        let banner = r"
   _ _
 _| |_|_ _ ___ ___ ___ ___
| . | | | |_ -|  _| .'|   |
|___|_|_  |___|___|__,|_|_|
      |___|";
        println!("{}", banner.green());
        println!(
            "{}\n",
            "Hold the device button for 5 seconds, then let us find it.".italic()
        );
    };
}
