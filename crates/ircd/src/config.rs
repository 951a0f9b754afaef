//! Permissive `key=value` settings file (§6 "Persisted state"). Recognized keys are looked up by
//! name; anything else is ignored, matching the original C parser's permissive behavior.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address 0.0.0.0:{0}")]
    InvalidAddr(u16),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_name: String,
    pub port: u16,
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_name: "irc.server.com".to_owned(),
            port: 50100,
            max_clients: 128,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Config {
        let mut config = Config::default();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::debug!("Could not read config file {:?}: {}", path, err);
                return config;
            }
        };
        config.apply(&text);
        config
    }

    /// The address the server listens on: always all interfaces, on the configured port.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("0.0.0.0:{}", self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.port))
    }

    fn apply(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let (key, value) = match line.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "hostname" => self.server_name = value.to_owned(),
                "port" => {
                    if let Ok(port) = value.parse() {
                        self.port = port;
                    }
                }
                "max_clients" => {
                    if let Ok(n) = value.parse() {
                        self.max_clients = n;
                    }
                }
                // "nickname", "username", "realname", "color" are client-side keys; ignored here.
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_keys_and_ignores_others() {
        let mut config = Config::default();
        config.apply("port=6667\nmax_clients=50\nnickname=ignored\nfoo=bar\n");
        assert_eq!(config.port, 6667);
        assert_eq!(config.max_clients, 50);
        assert_eq!(config.server_name, "irc.server.com");
    }

    #[test]
    fn blank_and_comment_lines_ignored() {
        let mut config = Config::default();
        config.apply("# comment\n\nport=7000\n");
        assert_eq!(config.port, 7000);
    }
}
