mod cli;
mod config;
mod conn;
mod dispatcher;
mod server;

use std::path::PathBuf;

fn main() {
    env_logger::init();

    let cli::Args {
        port,
        server_name,
        config_path,
    } = cli::parse();

    let config_path = config_path.unwrap_or_else(default_config_path);
    let mut config = config::Config::load(&config_path);
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(server_name) = server_name {
        config.server_name = server_name;
    }

    let addr = match config.addr() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut server = match server::Server::bind(addr, config.server_name.clone(), config.max_clients) {
        Ok(server) => server,
        Err(err) => {
            eprintln!("Could not bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    log::info!("ircd listening on {} as {}", addr, config.server_name);
    if let Err(err) = server.run() {
        eprintln!("Fatal server error: {}", err);
        std::process::exit(1);
    }
}

fn default_config_path() -> PathBuf {
    dirs_config_dir().join("ircd.conf")
}

fn dirs_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config"))
        .unwrap_or_else(|| PathBuf::from("."))
}
