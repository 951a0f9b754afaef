//! Distinguishes local commands from plain channel messages (§4.2: "a leading `/` on user input
//! denotes a command to be executed or forwarded; absence of `/` in a non-channel context is an
//! error"), in the same spirit as `tiny/src/cmd.rs`'s `/`-prefixed dispatch table, except this
//! system speaks a fixed, spec-defined command set rather than a pluggable registry. Argument
//! grammar for the commands that are also forwarded to the server (`NICK`, `USER`, `JOIN`,
//! `PART`, `PRIVMSG`, `WHOIS`, `QUIT`) reuses `irc_wire::parse_line` directly, since the
//! trailing-parameter rule is identical on both sides of the `/`.

use irc_wire::parse_line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCmd {
    Connect {
        host: Option<String>,
        port: Option<u16>,
    },
    Disconnect {
        msg: Option<String>,
    },
    Nick(String),
    User {
        user: String,
        host: String,
        real: String,
    },
    Join(String),
    Part {
        chan: String,
        msg: Option<String>,
    },
    Privmsg {
        target: String,
        text: String,
    },
    Whois(String),
    Quit {
        msg: Option<String>,
    },
    Help(Option<String>),
    /// Recognized verb, wrong shape of arguments.
    BadParams(&'static str),
    Unknown(String),
}

/// What one line of raw user input resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Local(LocalCmd),
    /// Plain text with no leading `/`: a message to whichever channel is current.
    Message(String),
    /// Plain text with no leading `/` and no channel joined.
    NoChannel,
}

pub fn parse_input(line: &str, in_channel: bool) -> Input {
    match line.strip_prefix('/') {
        Some(rest) => Input::Local(parse_local(rest)),
        None if in_channel => Input::Message(line.to_owned()),
        None => Input::NoChannel,
    }
}

fn parse_local(rest: &str) -> LocalCmd {
    let parsed = parse_line(rest);
    match parsed.verb.as_str() {
        "" => LocalCmd::Unknown(String::new()),
        "CONNECT" => LocalCmd::Connect {
            host: parsed.params.first().cloned(),
            port: parsed.params.get(1).and_then(|p| p.parse().ok()),
        },
        "DISCONNECT" => LocalCmd::Disconnect {
            msg: parsed.params.first().cloned(),
        },
        "NICK" => match parsed.params.first() {
            Some(nick) => LocalCmd::Nick(nick.clone()),
            None => LocalCmd::BadParams("NICK"),
        },
        "USER" => {
            if parsed.params.len() >= 4 {
                LocalCmd::User {
                    user: parsed.params[0].clone(),
                    host: parsed.params[1].clone(),
                    real: parsed.params[3].clone(),
                }
            } else {
                LocalCmd::BadParams("USER")
            }
        }
        "JOIN" => match parsed.params.first() {
            Some(chan) => LocalCmd::Join(chan.clone()),
            None => LocalCmd::BadParams("JOIN"),
        },
        "PART" => match parsed.params.first() {
            Some(chan) => LocalCmd::Part {
                chan: chan.clone(),
                msg: parsed.params.get(1).cloned(),
            },
            None => LocalCmd::BadParams("PART"),
        },
        "PRIVMSG" | "MSG" => {
            if parsed.params.len() >= 2 {
                LocalCmd::Privmsg {
                    target: parsed.params[0].clone(),
                    text: parsed.params[1].clone(),
                }
            } else {
                LocalCmd::BadParams("PRIVMSG")
            }
        }
        "WHOIS" => match parsed.params.first() {
            Some(nick) => LocalCmd::Whois(nick.clone()),
            None => LocalCmd::BadParams("WHOIS"),
        },
        "QUIT" => LocalCmd::Quit {
            msg: parsed.params.first().cloned(),
        },
        "HELP" => LocalCmd::Help(parsed.params.first().cloned()),
        other => LocalCmd::Unknown(other.to_owned()),
    }
}

pub const HELP_TEXT: &str = "\
/CONNECT [host [port]]   connect to a server (default 127.0.0.1:50100)
/DISCONNECT [:msg]       close the current connection
/NICK <nick>             set or change your nickname
/USER <user> <host> <*> :<real>   register (sent automatically on connect)
/JOIN <#channel>         join a channel
/PART <#channel> [:msg]  leave a channel
/PRIVMSG <target> :<msg> message a nick or channel
/WHOIS <nick>            look up a user
/QUIT [:msg]             disconnect and exit
/HELP [cmd]              show this message";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_prefix_is_local() {
        assert_eq!(
            parse_input("/NICK john", false),
            Input::Local(LocalCmd::Nick("john".to_owned()))
        );
    }

    #[test]
    fn plain_text_in_channel_is_message() {
        assert_eq!(
            parse_input("hello there", true),
            Input::Message("hello there".to_owned())
        );
    }

    #[test]
    fn plain_text_without_channel_is_error() {
        assert_eq!(parse_input("hello", false), Input::NoChannel);
    }

    #[test]
    fn join_parses_channel() {
        assert_eq!(
            parse_input("/JOIN #general", false),
            Input::Local(LocalCmd::Join("#general".to_owned()))
        );
    }

    #[test]
    fn part_with_trailing_message() {
        assert_eq!(
            parse_input("/PART #general :goodbye all", false),
            Input::Local(LocalCmd::Part {
                chan: "#general".to_owned(),
                msg: Some("goodbye all".to_owned()),
            })
        );
    }

    #[test]
    fn user_requires_four_params() {
        assert_eq!(
            parse_input("/USER john", false),
            Input::Local(LocalCmd::BadParams("USER"))
        );
        assert_eq!(
            parse_input("/USER john 127.0.0.1 * :John Doe", false),
            Input::Local(LocalCmd::User {
                user: "john".to_owned(),
                host: "127.0.0.1".to_owned(),
                real: "John Doe".to_owned(),
            })
        );
    }

    #[test]
    fn connect_with_host_and_port() {
        assert_eq!(
            parse_input("/CONNECT irc.example.com 6667", false),
            Input::Local(LocalCmd::Connect {
                host: Some("irc.example.com".to_owned()),
                port: Some(6667),
            })
        );
    }

    #[test]
    fn unknown_local_command() {
        assert_eq!(
            parse_input("/FROB", false),
            Input::Local(LocalCmd::Unknown("FROB".to_owned()))
        );
    }

    #[test]
    fn case_insensitive_verb() {
        assert_eq!(
            parse_input("/join #general", false),
            Input::Local(LocalCmd::Join("#general".to_owned()))
        );
    }
}
