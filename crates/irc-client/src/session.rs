//! The TCP session to the server (§3: "the TCP session owns the socket and its inbound buffer"),
//! adapted from `libtiny_client`'s connection handling but driven synchronously by the caller's
//! own `mio::Poll` instead of a `tokio` runtime, per §5's single-threaded cooperative model —
//! the same adaptation `ircd::conn::ClientSlot` makes on the server side.

use irc_wire::LineBuffer;
use mio::net::TcpStream;
use mio::{Interest, Poll, Token};
use std::io::{self, Read, Write};
use std::net::SocketAddr;

/// Fixed token for the (single) server connection; the client only ever has one.
pub const SERVER_TOKEN: Token = Token(0);

const READ_CHUNK: usize = 4096;

pub struct Session {
    stream: Option<TcpStream>,
    addr: Option<SocketAddr>,
    inbound: LineBuffer,
    write_pending: Vec<u8>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            stream: None,
            addr: None,
            inbound: LineBuffer::new(),
            write_pending: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Checks for a pending socket error, e.g. a failed nonblocking connect. `Ok(None)` means the
    /// connection is healthy (or there is none).
    pub fn take_error(&self) -> io::Result<Option<io::Error>> {
        match &self.stream {
            Some(stream) => stream.take_error(),
            None => Ok(None),
        }
    }

    /// Opens a new TCP connection and registers it with `poll` under `SERVER_TOKEN`. Callers
    /// must `disconnect` any existing connection first.
    pub fn connect(&mut self, poll: &Poll, addr: SocketAddr) -> io::Result<()> {
        let mut stream = TcpStream::connect(addr)?;
        poll.registry().register(
            &mut stream,
            SERVER_TOKEN,
            Interest::READABLE | Interest::WRITABLE,
        )?;
        self.stream = Some(stream);
        self.addr = Some(addr);
        self.inbound = LineBuffer::new();
        self.write_pending.clear();
        Ok(())
    }

    /// Deregisters and drops the connection, if any.
    pub fn disconnect(&mut self, poll: &Poll) {
        if let Some(mut stream) = self.stream.take() {
            let _ = poll.registry().deregister(&mut stream);
        }
        self.addr = None;
        self.write_pending.clear();
    }

    /// Queues one command line, CRLF-framed, for the next `flush`.
    pub fn send(&mut self, line: &str) {
        if self.stream.is_some() {
            self.write_pending.extend_from_slice(&irc_wire::frame(line));
        }
    }

    /// Reads everything currently available and returns the complete lines extracted. An `Err`
    /// means the connection is fatally broken (peer close or I/O error, §4.1) and the caller
    /// must `disconnect`.
    pub fn read_lines(&mut self) -> io::Result<Vec<String>> {
        let stream = match &mut self.stream {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };

        let mut buf = [0u8; READ_CHUNK];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "peer closed the connection",
                    ));
                }
                Ok(n) => self.inbound.feed(&buf[..n]),
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        let mut lines = Vec::new();
        while let Some(bytes) = self.inbound.next_line() {
            lines.push(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(lines)
    }

    /// Writes as much of the pending buffer as won't block.
    pub fn flush(&mut self) -> io::Result<()> {
        let stream = match &mut self.stream {
            Some(s) => s,
            None => return Ok(()),
        };
        while !self.write_pending.is_empty() {
            match stream.write(&self.write_pending) {
                Ok(0) => break,
                Ok(n) => {
                    self.write_pending.drain(0..n);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
