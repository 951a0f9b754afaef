//! CRLF line framing, message parsing, and reply formatting for the IRC subset both `ircd` and
//! `irc-client` speak. Split the way `libtiny_wire` is split, with framing added since the
//! teacher's crate only ever saw whole messages from an async codec.

pub mod framing;
pub mod message;
pub mod parse;
pub mod reply;

pub use framing::{frame, LineBuffer, MAX_PAYLOAD};
pub use message::{parse_message, Cmd, Msg};
pub use parse::{parse_line, ParsedLine, MAX_PARAMS};
pub use reply::{format_peer_msg, format_reply, Reply};
