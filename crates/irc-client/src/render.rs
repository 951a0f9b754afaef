//! Turns one raw line received from the server into a line for the scrollback. Numeric replies
//! show their human-readable trailing part (§6: the last argument is always `:<human-message>`);
//! forwarded peer messages (`JOIN`/`PART`/`QUIT`/`NICK`/`PRIVMSG`) are rendered the conventional
//! way IRC clients show them, grounded in the status strings `tiny/src/conn.rs` prints for the
//! analogous connection events.

use irc_wire::{parse_line, ParsedLine};

pub fn render_line(line: &str) -> String {
    let parsed = parse_line(line);
    if parsed.verb.parse::<u16>().is_ok() {
        render_numeric(&parsed)
    } else {
        render_peer(&parsed)
    }
}

fn render_numeric(parsed: &ParsedLine) -> String {
    match parsed.params.last() {
        Some(msg) => msg.clone(),
        None => format!("[{}]", parsed.verb),
    }
}

fn nick_of(parsed: &ParsedLine) -> &str {
    parsed
        .prefix
        .as_deref()
        .and_then(|p| p.split('!').next())
        .unwrap_or("*")
}

fn render_peer(parsed: &ParsedLine) -> String {
    let nick = nick_of(parsed);
    match parsed.verb.as_str() {
        "JOIN" => {
            let chan = parsed.params.first().map(String::as_str).unwrap_or("");
            format!("* {nick} has joined {chan}")
        }
        "PART" => {
            let chan = parsed.params.first().map(String::as_str).unwrap_or("");
            match parsed.params.get(1) {
                Some(msg) => format!("* {nick} has left {chan} ({msg})"),
                None => format!("* {nick} has left {chan}"),
            }
        }
        "QUIT" => {
            let msg = parsed.params.first().map(String::as_str).unwrap_or("");
            format!("* {nick} has quit ({msg})")
        }
        "NICK" => {
            let new_nick = parsed.params.first().map(String::as_str).unwrap_or("");
            format!("* {nick} is now known as {new_nick}")
        }
        "PRIVMSG" => {
            let text = parsed.params.get(1).map(String::as_str).unwrap_or("");
            format!("<{nick}> {text}")
        }
        other => format!("* {nick} {other} {}", parsed.params.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_numeric_shows_message() {
        assert_eq!(
            render_line(":irc.server.com 001 john :Welcome to the IRC Network"),
            "Welcome to the IRC Network"
        );
    }

    #[test]
    fn join_peer_message() {
        assert_eq!(
            render_line(":john!@ JOIN #general"),
            "* john has joined #general"
        );
    }

    #[test]
    fn privmsg_peer_message() {
        assert_eq!(
            render_line(":john!@ PRIVMSG #general :hello"),
            "<john> hello"
        );
    }

    #[test]
    fn part_with_message() {
        assert_eq!(
            render_line(":john!@ PART #general :bye"),
            "* john has left #general (bye)"
        );
    }

    #[test]
    fn quit_peer_message() {
        assert_eq!(
            render_line(":john!@ QUIT :Connection closed"),
            "* john has quit (Connection closed)"
        );
    }
}
