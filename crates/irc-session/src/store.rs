//! The server's session store (§4.3): two hash indexes (nickname, channel name) plus the
//! bipartite membership relation, kept mutually consistent on every join/part/remove. Single
//! writer only — the poll loop — per §5; no internal locking.

use crate::channel::{Channel, Lifecycle, MAX_MEMBERS_PER_CHANNEL};
use crate::error::SessionError;
use crate::user::{User, UserId, MAX_CHANNELS_PER_USER};
use irc_common::{ChanName, Djb2Hash, Nickname};
use std::collections::{HashMap, HashSet};

type Djb2Map<K, V> = HashMap<K, V, Djb2Hash>;

#[derive(Default)]
pub struct SessionStore {
    users: HashMap<UserId, User>,
    nick_index: Djb2Map<String, UserId>,
    channels: Djb2Map<String, Channel>,
    /// user -> set of normalized channel names it has joined (mirrors `Channel::members`).
    membership: HashMap<UserId, HashSet<String>>,
}

fn norm_nick(nick: &str) -> String {
    Nickname::new(nick.to_owned()).normalized()
}

fn norm_chan(name: &str) -> String {
    ChanName::new(name.to_owned()).normalized()
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            users: HashMap::new(),
            nick_index: Djb2Map::default(),
            channels: Djb2Map::default(),
            membership: HashMap::new(),
        }
    }

    /// Registers a brand-new connection slot with no nickname yet. Nickname indexing happens
    /// separately via `rename_user` once `NICK` is accepted.
    pub fn insert_user(&mut self, id: UserId) {
        self.users.insert(id, User::new(id));
        self.membership.insert(id, HashSet::new());
    }

    /// Removes a user entirely: cascades through every channel it was a member of, destroying
    /// any `Temporary` channel left empty, and drops the nickname index entry.
    pub fn remove_user(&mut self, id: UserId) -> Option<User> {
        let chans = self.membership.remove(&id).unwrap_or_default();
        for chan_key in chans {
            if let Some(chan) = self.channels.get_mut(&chan_key) {
                chan.members.remove(&id);
                if chan.is_empty() && chan.lifecycle == Lifecycle::Temporary {
                    self.channels.remove(&chan_key);
                }
            }
        }
        let user = self.users.remove(&id)?;
        if let Some(nick) = &user.nickname {
            self.nick_index.remove(&norm_nick(nick));
        }
        Some(user)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn lookup_user_by_nick(&self, nick: &str) -> Option<&User> {
        let id = self.nick_index.get(&norm_nick(nick))?;
        self.users.get(id)
    }

    /// Sets or changes a user's nickname. Fails with `NicknameInUse` if another live user
    /// already holds it (case-insensitively). Rewrites the nickname index key in place.
    pub fn rename_user(&mut self, id: UserId, new_nick: &str) -> Result<(), SessionError> {
        let key = norm_nick(new_nick);
        if let Some(existing) = self.nick_index.get(&key) {
            if *existing != id {
                return Err(SessionError::NicknameInUse);
            }
        }

        let user = self.users.get_mut(&id).ok_or(SessionError::UnknownUser(id))?;
        if let Some(old_nick) = &user.nickname {
            self.nick_index.remove(&norm_nick(old_nick));
        }
        user.nickname = Some(new_nick.to_owned());
        self.nick_index.insert(key, id);
        Ok(())
    }

    pub fn insert_channel(&mut self, name: &str, lifecycle: Lifecycle) {
        let key = norm_chan(name);
        self.channels
            .entry(key)
            .or_insert_with(|| Channel::new(name.to_owned(), lifecycle));
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let key = norm_chan(name);
        let chan = self.channels.remove(&key)?;
        for member in &chan.members {
            if let Some(set) = self.membership.get_mut(member) {
                set.remove(&key);
            }
        }
        Some(chan)
    }

    pub fn lookup_channel_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&norm_chan(name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&norm_chan(name))
    }

    /// Adds `user` to `channel`, creating the channel as `Temporary` if it doesn't exist yet.
    /// Both sides of the membership relation are updated together; neither is mutated if the
    /// capacity checks fail.
    pub fn join(&mut self, user: UserId, channel: &str) -> Result<(), SessionError> {
        let key = norm_chan(channel);
        self.channels
            .entry(key.clone())
            .or_insert_with(|| Channel::new(channel.to_owned(), Lifecycle::Temporary));

        let member_count = self.channels.get(&key).unwrap().members.len();
        let user_chan_count = self.membership.get(&user).map_or(0, |s| s.len());

        if member_count >= MAX_MEMBERS_PER_CHANNEL {
            return Err(SessionError::ChannelFull);
        }
        if user_chan_count >= MAX_CHANNELS_PER_USER {
            return Err(SessionError::TooManyChannels);
        }

        self.channels.get_mut(&key).unwrap().members.insert(user);
        self.membership.entry(user).or_default().insert(key);
        Ok(())
    }

    /// Removes `user` from `channel`. Destroys the channel if it is `Temporary` and now empty.
    pub fn part(&mut self, user: UserId, channel: &str) -> Result<(), SessionError> {
        let key = norm_chan(channel);
        let chan = self
            .channels
            .get_mut(&key)
            .ok_or(SessionError::NoSuchChannel)?;
        if !chan.members.remove(&user) {
            return Err(SessionError::NotOnChannel);
        }
        if let Some(set) = self.membership.get_mut(&user) {
            set.remove(&key);
        }
        if chan.is_empty() && chan.lifecycle == Lifecycle::Temporary {
            self.channels.remove(&key);
        }
        Ok(())
    }

    pub fn users_in_channel(&self, channel: &str) -> Vec<UserId> {
        self.channels
            .get(&norm_chan(channel))
            .map(|c| c.members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn channels_of_user(&self, user: UserId) -> Vec<String> {
        self.membership
            .get(&user)
            .map(|set| {
                set.iter()
                    .filter_map(|key| self.channels.get(key).map(|c| c.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(store: &mut SessionStore, id: UserId, nick: &str) {
        store.insert_user(id);
        store.rename_user(id, nick).unwrap();
    }

    #[test]
    fn nickname_uniqueness() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        store.insert_user(UserId(2));
        assert_eq!(
            store.rename_user(UserId(2), "john"),
            Err(SessionError::NicknameInUse)
        );
        assert_eq!(
            store.rename_user(UserId(2), "JOHN"),
            Err(SessionError::NicknameInUse)
        );
    }

    #[test]
    fn lookup_returns_inserted_user() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        assert_eq!(store.lookup_user_by_nick("john").unwrap().id, UserId(1));
        assert_eq!(store.lookup_user_by_nick("JOHN").unwrap().id, UserId(1));
    }

    #[test]
    fn membership_symmetry() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        store.join(UserId(1), "#general").unwrap();
        assert!(store.users_in_channel("#general").contains(&UserId(1)));
        assert!(store
            .channels_of_user(UserId(1))
            .iter()
            .any(|c| c == "#general"));

        store.part(UserId(1), "#general").unwrap();
        assert!(!store.users_in_channel("#general").contains(&UserId(1)));
        assert!(store.channels_of_user(UserId(1)).is_empty());
    }

    #[test]
    fn temporary_channel_destroyed_when_empty() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        store.join(UserId(1), "#general").unwrap();
        assert!(store.lookup_channel_by_name("#general").is_some());
        store.part(UserId(1), "#general").unwrap();
        assert!(store.lookup_channel_by_name("#general").is_none());
    }

    #[test]
    fn join_part_restores_prior_state() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        registered(&mut store, UserId(2), "mark");
        store.join(UserId(1), "#general").unwrap();
        store.join(UserId(2), "#general").unwrap();
        store.part(UserId(2), "#general").unwrap();
        // Channel survives: still has john.
        assert!(store.lookup_channel_by_name("#general").is_some());
        assert_eq!(store.users_in_channel("#general"), vec![UserId(1)]);
    }

    #[test]
    fn channel_full_rejects_join() {
        let mut store = SessionStore::new();
        for i in 0..MAX_MEMBERS_PER_CHANNEL {
            let id = UserId(i);
            registered(&mut store, id, &format!("n{i}"));
            store.join(id, "#general").unwrap();
        }
        let overflow = UserId(MAX_MEMBERS_PER_CHANNEL);
        registered(&mut store, overflow, "over");
        assert_eq!(
            store.join(overflow, "#general"),
            Err(SessionError::ChannelFull)
        );
    }

    #[test]
    fn remove_user_cascades_through_membership() {
        let mut store = SessionStore::new();
        registered(&mut store, UserId(1), "john");
        store.join(UserId(1), "#general").unwrap();
        store.remove_user(UserId(1));
        assert!(store.lookup_channel_by_name("#general").is_none());
        assert!(store.lookup_user_by_nick("john").is_none());
    }
}
