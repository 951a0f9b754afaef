//! Named session-store error enum (§7 "Resource"/"Argument" taxonomy). These never reach the
//! wire directly; `ircd`'s dispatcher maps them onto numeric replies.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("nickname already in use")]
    NicknameInUse,
    #[error("no such nickname")]
    NoSuchNick,
    #[error("no such channel")]
    NoSuchChannel,
    #[error("not a member of that channel")]
    NotOnChannel,
    #[error("channel is full")]
    ChannelFull,
    #[error("user is already in that many channels")]
    TooManyChannels,
    #[error("unknown user id {0:?}")]
    UnknownUser(crate::user::UserId),
}
