//! Permissive `key=value` settings file (§6 "Persisted state"), the client-side counterpart of
//! `ircd::config`: same parser shape, different recognized key set.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub nickname: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    pub color: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
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
                "nickname" => self.nickname = Some(value.to_owned()),
                "username" => self.username = Some(value.to_owned()),
                "realname" => self.realname = Some(value.to_owned()),
                "color" => self.color = Some(value.to_owned()),
                "hostname" => self.hostname = Some(value.to_owned()),
                "port" => self.port = value.parse().ok(),
                // "max_clients" is a server-side key; ignored here.
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
        config.apply("nickname=john\nport=6667\nmax_clients=50\nfoo=bar\n");
        assert_eq!(config.nickname.as_deref(), Some("john"));
        assert_eq!(config.port, Some(6667));
    }

    #[test]
    fn blank_and_comment_lines_ignored() {
        let mut config = Config::default();
        config.apply("# comment\n\nhostname=irc.example.com\n");
        assert_eq!(config.hostname.as_deref(), Some("irc.example.com"));
    }
}
