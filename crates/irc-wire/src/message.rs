//! Structured representation of a parsed command (§2 "Message model", §4.4 dispatcher
//! contracts). `Cmd::from_parsed` maps a [`crate::parse::ParsedLine`] onto the verb subset this
//! system supports; anything else becomes `Cmd::Unknown`.

use crate::parse::ParsedLine;
use irc_common::ChanName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msg {
    pub prefix: Option<String>,
    pub cmd: Cmd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Nick {
        nick: String,
    },
    User {
        user: String,
        host: String,
        real: String,
    },
    Join {
        chan: ChanName,
    },
    Part {
        chan: ChanName,
        msg: Option<String>,
    },
    Privmsg {
        target: String,
        text: String,
    },
    Whois {
        nick: String,
    },
    Quit {
        msg: Option<String>,
    },
    /// Recognized verb, but the parameter count/shape doesn't match its contract; the caller
    /// maps this to `461` (not enough params) rather than `421`.
    BadParams {
        verb: String,
    },
    Unknown {
        verb: String,
    },
}

pub fn parse_message(line: &str) -> Msg {
    let parsed: ParsedLine = crate::parse::parse_line(line);
    let cmd = Cmd::from_parsed(&parsed);
    Msg {
        prefix: parsed.prefix,
        cmd,
    }
}

impl Cmd {
    pub fn from_parsed(p: &ParsedLine) -> Cmd {
        match p.verb.as_str() {
            "NICK" => match p.params.first() {
                Some(nick) => Cmd::Nick { nick: nick.clone() },
                None => Cmd::BadParams {
                    verb: "NICK".to_owned(),
                },
            },
            "USER" => {
                if p.params.len() >= 4 {
                    Cmd::User {
                        user: p.params[0].clone(),
                        host: p.params[1].clone(),
                        real: p.params[3].clone(),
                    }
                } else {
                    Cmd::BadParams {
                        verb: "USER".to_owned(),
                    }
                }
            }
            "JOIN" => match p.params.first() {
                Some(chan) => Cmd::Join {
                    chan: ChanName::new(chan.clone()),
                },
                None => Cmd::BadParams {
                    verb: "JOIN".to_owned(),
                },
            },
            "PART" => match p.params.first() {
                Some(chan) => Cmd::Part {
                    chan: ChanName::new(chan.clone()),
                    msg: p.params.get(1).cloned(),
                },
                None => Cmd::BadParams {
                    verb: "PART".to_owned(),
                },
            },
            "PRIVMSG" => {
                if p.params.len() >= 2 {
                    Cmd::Privmsg {
                        target: p.params[0].clone(),
                        text: p.params[1].clone(),
                    }
                } else {
                    Cmd::BadParams {
                        verb: "PRIVMSG".to_owned(),
                    }
                }
            }
            "WHOIS" => match p.params.first() {
                Some(nick) => Cmd::Whois { nick: nick.clone() },
                None => Cmd::BadParams {
                    verb: "WHOIS".to_owned(),
                },
            },
            "QUIT" => Cmd::Quit {
                msg: p.params.first().cloned(),
            },
            other => Cmd::Unknown {
                verb: other.to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nick() {
        let msg = parse_message("NICK john");
        assert_eq!(
            msg.cmd,
            Cmd::Nick {
                nick: "john".to_owned()
            }
        );
    }

    #[test]
    fn parses_user_with_trailing_realname() {
        let msg = parse_message("USER john 127.0.0.1 * :John Doe");
        assert_eq!(
            msg.cmd,
            Cmd::User {
                user: "john".to_owned(),
                host: "127.0.0.1".to_owned(),
                real: "John Doe".to_owned(),
            }
        );
    }

    #[test]
    fn unknown_verb() {
        let msg = parse_message("FROB 1 2");
        assert_eq!(
            msg.cmd,
            Cmd::Unknown {
                verb: "FROB".to_owned()
            }
        );
    }

    #[test]
    fn nick_missing_param() {
        let msg = parse_message("NICK");
        assert_eq!(
            msg.cmd,
            Cmd::BadParams {
                verb: "NICK".to_owned()
            }
        );
    }
}
