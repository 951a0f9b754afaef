//! The server poll loop (§4.5), grounded in `adedomin-r8ball`'s `mio`-based `event_loop`: a
//! single `mio::Poll` drives accept, read, dispatch, and outbound drain every turn. Nothing here
//! blocks except the poll call itself, per §5.

use crate::conn::{ConnTable, LISTENER_TOKEN};
use crate::dispatcher::Dispatcher;
use irc_session::{SessionStore, UserId};
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const READ_CHUNK: usize = 4096;

pub struct Server {
    poll: Poll,
    events: Events,
    listener: TcpListener,
    conns: ConnTable,
    store: SessionStore,
    dispatcher: Dispatcher,
    next_user_id: usize,
}

impl Server {
    pub fn bind(addr: SocketAddr, server_name: String, max_clients: usize) -> io::Result<Server> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;

        Ok(Server {
            poll,
            events: Events::with_capacity(256),
            listener,
            conns: ConnTable::new(max_clients),
            store: SessionStore::new(),
            dispatcher: Dispatcher::new(server_name),
            next_user_id: 1,
        })
    }

    /// Runs the poll loop forever (until a fatal I/O error on the listener itself).
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.turn()?;
        }
    }

    /// One iteration of the loop: poll, accept, read+dispatch, drain outbound, reap idle fds.
    /// Exposed separately from `run` so tests can drive a bounded number of turns.
    pub fn turn(&mut self) -> io::Result<()> {
        self.poll.poll(&mut self.events, None)?;

        let tokens: Vec<Token> = self.events.iter().map(|e| e.token()).collect();
        for token in tokens {
            if token == LISTENER_TOKEN {
                self.accept_all();
            } else {
                self.read_one(token);
            }
        }

        self.drain_outbound();
        self.reap_idle();
        Ok(())
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    let user_id = UserId(self.next_user_id);
                    self.next_user_id += 1;
                    self.store.insert_user(user_id);

                    match self.conns.insert(&self.poll, stream, addr, user_id) {
                        Ok(Some(_token)) => {
                            log::info!("accepted connection from {}", addr);
                        }
                        Ok(None) => {
                            log::warn!("connection table full, dropping {}", addr);
                            self.store.remove_user(user_id);
                            // `stream` was consumed by `insert`'s attempt; nothing left to close
                            // explicitly here since it was never registered.
                        }
                        Err(err) => {
                            log::warn!("could not register new connection: {}", err);
                            self.store.remove_user(user_id);
                        }
                    }
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    log::warn!("accept error: {}", err);
                    break;
                }
            }
        }
    }

    fn read_one(&mut self, token: Token) {
        let user_id = match self.conns.get(token) {
            Some(slot) => slot.user_id,
            None => return,
        };

        let mut buf = [0u8; READ_CHUNK];
        loop {
            let read_result = match self.conns.get_mut(token) {
                Some(slot) => slot.stream.read(&mut buf),
                None => return,
            };

            match read_result {
                Ok(0) => {
                    self.evict(token, user_id);
                    return;
                }
                Ok(n) => {
                    if let Some(slot) = self.conns.get_mut(token) {
                        slot.inbound.feed(&buf[..n]);
                        slot.last_active = Instant::now();
                    }
                    self.drain_lines(token, user_id);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.evict(token, user_id);
                    return;
                }
            }
        }
    }

    fn drain_lines(&mut self, token: Token, user_id: UserId) {
        loop {
            let line = match self.conns.get_mut(token) {
                Some(slot) => slot.inbound.next_line(),
                None => return,
            };
            match line {
                Some(bytes) => {
                    let line = String::from_utf8_lossy(&bytes).to_string();
                    self.dispatcher.handle_line(&mut self.store, user_id, &line);
                }
                None => return,
            }
        }
    }

    fn drain_outbound(&mut self) {
        let tokens: Vec<Token> = self.conns.iter_tokens().collect();
        for token in tokens {
            let user_id = match self.conns.get(token) {
                Some(slot) => slot.user_id,
                None => continue,
            };

            while let Some(line) = self.store.user_mut(user_id).and_then(|u| u.outbound.dequeue()) {
                let mut bytes = irc_wire::frame(&line);
                if let Some(slot) = self.conns.get_mut(token) {
                    slot.write_pending.append(&mut bytes);
                }
            }

            self.flush_pending(token, user_id);
        }
    }

    fn flush_pending(&mut self, token: Token, user_id: UserId) {
        loop {
            let slot = match self.conns.get_mut(token) {
                Some(slot) => slot,
                None => return,
            };
            if slot.write_pending.is_empty() {
                return;
            }
            match slot.stream.write(&slot.write_pending) {
                Ok(0) => return,
                Ok(n) => {
                    slot.write_pending.drain(0..n);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.evict(token, user_id);
                    return;
                }
            }
        }
    }

    fn reap_idle(&mut self) {
        let now = Instant::now();
        let expired: Vec<(Token, UserId)> = self
            .conns
            .iter_tokens()
            .filter_map(|token| {
                self.conns.get(token).and_then(|slot| {
                    if now.duration_since(slot.last_active) > IDLE_TIMEOUT {
                        Some((token, slot.user_id))
                    } else {
                        None
                    }
                })
            })
            .collect();
        for (token, user_id) in expired {
            log::info!("evicting idle connection {:?}", user_id);
            self.evict(token, user_id);
        }
    }

    /// Removes a connection: broadcasts a synthetic QUIT, drops it from the session store, and
    /// deregisters/closes its fd.
    fn evict(&mut self, token: Token, user_id: UserId) {
        self.dispatcher.handle_line(&mut self.store, user_id, "QUIT :Connection closed");
        self.store.remove_user(user_id);
        self.conns.remove(&self.poll, token);
    }
}
