//! The fixed-capacity connection table (§4.5, §9 "a single table whose slot holds the full
//! per-connection state"). Slot 0 is reserved for the listening socket; slots `1..=capacity` hold
//! client connections. `mio::Token`s are slot indices, so evicting a slot by swapping the last
//! active slot into the vacated one requires re-registering the moved connection under its new
//! token.

use irc_session::UserId;
use irc_wire::LineBuffer;
use mio::net::TcpStream;
use mio::{Interest, Poll, Token};
use std::io;
use std::net::SocketAddr;
use std::time::Instant;

pub const LISTENER_TOKEN: Token = Token(0);

pub struct ClientSlot {
    pub stream: TcpStream,
    pub addr: SocketAddr,
    pub user_id: UserId,
    pub inbound: LineBuffer,
    pub last_active: Instant,
    /// Bytes queued for this fd that didn't fit in the last nonblocking write.
    pub write_pending: Vec<u8>,
}

/// Packed array of client slots: `slots[0..active]` are occupied, the rest are free. Index `i`
/// (1-based into the conceptual table, 0-based here) doubles as the fd's `mio::Token` value
/// minus one.
pub struct ConnTable {
    slots: Vec<Option<ClientSlot>>,
    capacity: usize,
}

fn token_for(slot_idx: usize) -> Token {
    Token(slot_idx + 1)
}

impl ConnTable {
    pub fn new(capacity: usize) -> Self {
        ConnTable {
            slots: (0..capacity).map(|_| None).collect(),
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    /// Registers a freshly-accepted connection in the first free slot. Returns the fd's token if
    /// there was room; on `None` the caller must close the incoming fd (§4.5 step 2).
    pub fn insert(
        &mut self,
        poll: &Poll,
        mut stream: TcpStream,
        addr: SocketAddr,
        user_id: UserId,
    ) -> io::Result<Option<Token>> {
        let idx = match self.first_free() {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let token = token_for(idx);
        poll.registry()
            .register(&mut stream, token, Interest::READABLE)?;
        self.slots[idx] = Some(ClientSlot {
            stream,
            addr,
            user_id,
            inbound: LineBuffer::new(),
            last_active: Instant::now(),
            write_pending: Vec::new(),
        });
        Ok(Some(token))
    }

    pub fn get(&self, token: Token) -> Option<&ClientSlot> {
        self.slots.get(token.0.checked_sub(1)?)?.as_ref()
    }

    pub fn get_mut(&mut self, token: Token) -> Option<&mut ClientSlot> {
        self.slots.get_mut(token.0.checked_sub(1)?)?.as_mut()
    }

    /// Removes the connection at `token`, deregistering its fd from `poll`. Per §4.5's eviction
    /// policy, this does not shift all subsequent entries down; it just frees the slot, so
    /// iteration order is otherwise preserved.
    pub fn remove(&mut self, poll: &Poll, token: Token) -> Option<ClientSlot> {
        let idx = token.0.checked_sub(1)?;
        let mut slot = self.slots.get_mut(idx)?.take()?;
        let _ = poll.registry().deregister(&mut slot.stream);
        Some(slot)
    }

    pub fn iter_tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| s.as_ref().map(|_| token_for(idx)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
