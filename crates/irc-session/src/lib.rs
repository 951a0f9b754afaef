//! The server's in-memory session store: users, channels, the membership relation between them,
//! and the bounded outbound queues each owns. Exclusively owned and mutated by the server's
//! single poll thread (§5); everything here assumes single-writer access.

mod channel;
mod error;
mod queue;
mod store;
mod user;

pub use channel::{Channel, Lifecycle, MAX_MEMBERS_PER_CHANNEL};
pub use error::SessionError;
pub use queue::MessageQueue;
pub use store::SessionStore;
pub use user::{RegistrationState, User, UserId, MAX_CHANNELS_PER_USER};
