//! Hand-rolled argv parsing, in the same manual-loop style `tiny`'s own CLI parser uses rather
//! than a derive-based parser crate.

use std::path::PathBuf;

#[derive(Debug)]
pub struct Args {
    pub port: Option<u16>,
    pub server_name: Option<String>,
    pub config_path: Option<PathBuf>,
}

pub fn parse() -> Args {
    let mut port = None;
    let mut server_name = None;
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

        if arg == "-p" || arg == "--port" {
            match args.next().and_then(|p| p.parse().ok()) {
                Some(p) => {
                    port = Some(p);
                    continue;
                }
                None => {
                    eprintln!("Error: '--port <PORT>' requires a valid port number");
                    std::process::exit(1);
                }
            }
        }

        if arg == "-n" || arg == "--name" {
            match args.next() {
                Some(name) => {
                    server_name = Some(name);
                    continue;
                }
                None => {
                    eprintln!("Error: '--name <NAME>' requires a server name");
                    std::process::exit(1);
                }
            }
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

        eprintln!("Error: Found argument '{arg}' which wasn't expected");
        eprintln!("For more information try --help");
        std::process::exit(1);
    }

    Args {
        port,
        server_name,
        config_path,
    }
}

fn print_version() {
    println!("ircd {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    print_version();
    println!(
        "\
USAGE:
    ircd [OPTIONS]

OPTIONS:
    -p, --port <PORT>      Listening port (default 50100)
    -n, --name <NAME>      Server name used in reply prefixes
    -c, --config <FILE>    Use this config file
    -h, --help             Print help information
    -V, --version          Print version information",
    )
}
