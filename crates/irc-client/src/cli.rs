//! Hand-rolled argv parsing, in the same manual-loop style as `tiny/src/cli.rs` and
//! `ircd::cli`. Positional arguments are `[host [port]]`, mirroring the `/CONNECT` local
//! command's own argument shape (§6).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("'{0}' is not a valid port number")]
    InvalidPort(String),
}

#[derive(Debug)]
pub struct Args {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_path: Option<PathBuf>,
}

pub fn parse() -> Args {
    let mut host = None;
    let mut port = None;
    let mut config_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-V" || arg == "--version" {
            print_version();
            std::process::exit(0);
        }

        if arg == "-h" || arg == "--help" {
            print_help();
            std::process::exit(0);
        }

        if arg == "-c" || arg == "--config" {
            match args.next() {
                Some(path) => {
                    config_path = Some(path.into());
                    continue;
                }
                None => {
                    eprintln!("Error: '--config <FILE>' requires a file path");
                    std::process::exit(1);
                }
            }
        }

        if arg.starts_with('-') {
            eprintln!("Error: Found argument '{arg}' which wasn't expected");
            eprintln!("For more information try --help");
            std::process::exit(1);
        }

        if host.is_none() {
            host = Some(arg);
        } else if port.is_none() {
            match arg.parse() {
                Ok(p) => port = Some(p),
                Err(_) => {
                    eprintln!("Error: {}", CliError::InvalidPort(arg));
                    std::process::exit(1);
                }
            }
        } else {
            eprintln!("Error: Found argument '{arg}' which wasn't expected");
            std::process::exit(1);
        }
    }

    Args {
        host,
        port,
        config_path,
    }
}

fn print_version() {
    println!("irc-client {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    print_version();
    println!(
        "\
USAGE:
    irc-client [OPTIONS] [host [port]]

ARGS:
    <host>                  Server to connect to (default 127.0.0.1)
    <port>                  Port to connect to (default 50100)

OPTIONS:
    -c, --config <FILE>     Use this config file
    -h, --help              Print help information
    -V, --version           Print version information",
    )
}
