//! Numeric reply codes (§6) and line formatting for server replies and forwarded peer messages.
//! The code names are taken one-to-one from the original `libs/src/response_code.h`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    RplWelcome,    // 001
    RplWhoisUser,  // 311
    RplNoTopic,    // 331
    RplTopic,      // 332
    RplNamReply,   // 353
    RplEndOfNames, // 366
    ErrNoSuchNick,        // 401
    ErrNoSuchChannel,     // 403
    ErrUnknownCommand,    // 421
    ErrNoNicknameGiven,   // 431
    ErrErroneusNickname,  // 432
    ErrNicknameInUse,     // 433
    ErrNotOnChannel,      // 442
    ErrNotRegistered,     // 451
    ErrNeedMoreParams,    // 461
    ErrAlreadyRegistred,  // 462
    ErrChannelIsFull,     // 471
    ErrBadChanName,       // 479
}

impl Reply {
    pub fn code(self) -> u16 {
        match self {
            Reply::RplWelcome => 1,
            Reply::RplWhoisUser => 311,
            Reply::RplNoTopic => 331,
            Reply::RplTopic => 332,
            Reply::RplNamReply => 353,
            Reply::RplEndOfNames => 366,
            Reply::ErrNoSuchNick => 401,
            Reply::ErrNoSuchChannel => 403,
            Reply::ErrUnknownCommand => 421,
            Reply::ErrNoNicknameGiven => 431,
            Reply::ErrErroneusNickname => 432,
            Reply::ErrNicknameInUse => 433,
            Reply::ErrNotOnChannel => 442,
            Reply::ErrNotRegistered => 451,
            Reply::ErrNeedMoreParams => 461,
            Reply::ErrAlreadyRegistred => 462,
            Reply::ErrChannelIsFull => 471,
            Reply::ErrBadChanName => 479,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Formats a server reply line: `:<server> <code> <target> [args...] :<message>`.
pub fn format_reply(server_name: &str, reply: Reply, target: &str, args: &[&str], message: &str) -> String {
    let mut line = format!(":{} {} {}", server_name, reply, target);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line.push_str(" :");
    line.push_str(message);
    line
}

/// Formats a forwarded peer message: `:<nick>!<user>@<host> VERB [args...] [:<trailing>]`.
pub fn format_peer_msg(
    nick: &str,
    user: &str,
    host: &str,
    verb: &str,
    args: &[&str],
    trailing: Option<&str>,
) -> String {
    let mut line = format!(":{}!{}@{} {}", nick, user, host, verb);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    if let Some(trailing) = trailing {
        line.push_str(" :");
        line.push_str(trailing);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_reply_matches_scenario() {
        let line = format_reply(
            "irc.server.com",
            Reply::RplWelcome,
            "john",
            &[],
            "Welcome to the IRC Network",
        );
        assert_eq!(
            line,
            ":irc.server.com 001 john :Welcome to the IRC Network"
        );
    }

    #[test]
    fn nick_in_use_matches_scenario() {
        let line = format_reply(
            "irc.server.com",
            Reply::ErrNicknameInUse,
            "john",
            &[],
            "Nickname is already in use",
        );
        assert_eq!(line, ":irc.server.com 433 john :Nickname is already in use");
    }

    #[test]
    fn peer_join_matches_scenario() {
        let line = format_peer_msg("john", "", "", "JOIN", &["#general"], None);
        assert_eq!(line, ":john!@ JOIN #general");
    }

    #[test]
    fn peer_privmsg_matches_scenario() {
        let line = format_peer_msg("john", "", "", "PRIVMSG", &["#general"], Some("hello"));
        assert_eq!(line, ":john!@ PRIVMSG #general :hello");
    }
}
