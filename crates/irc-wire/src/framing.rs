//! CRLF line framing (§4.1). Both the server's per-client inbound buffer and the client's TCP
//! session buffer use this type: bytes arrive in arbitrary chunks, `\r\n`-terminated messages are
//! extracted as they complete, and a possibly-partial tail is retained across calls.

/// Maximum payload bytes in a line, not counting the trailing CRLF (§4.1: "≤ 510 payload bytes").
pub const MAX_PAYLOAD: usize = 510;

/// Accumulates bytes from repeated nonblocking reads and yields complete CRLF-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer { buf: Vec::new() }
    }

    /// Appends freshly-read bytes to the buffer. If no CRLF terminates the buffer within
    /// `MAX_PAYLOAD` bytes, the whole buffer is dropped and framing resumes from empty (§4.1:
    /// "over-length lines... are dropped and the buffer is reset").
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > MAX_PAYLOAD && !self.buf[..].windows(2).any(|w| w == b"\r\n") {
            self.buf.clear();
        }
    }

    /// Extracts the next complete line (without the trailing CRLF), if any. Call repeatedly
    /// until it returns `None` after each `feed`.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let crlf_idx = self.buf.windows(2).position(|w| w == b"\r\n")?;
        if crlf_idx > MAX_PAYLOAD {
            // Terminator arrived, but too late: the line was already over budget.
            self.buf.drain(0..crlf_idx + 2);
            return None;
        }
        let line = self.buf.drain(0..crlf_idx).collect();
        self.buf.drain(0..2); // remove "\r\n"
        Some(line)
    }

    /// Bytes currently retained as an incomplete tail.
    pub fn tail(&self) -> &[u8] {
        &self.buf
    }
}

/// Appends "\r\n" to a line destined for the socket. Outbound strings must never already
/// contain CRLF; callers build lines via `irc_wire::reply`/`Msg::format`.
pub fn frame(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len() + 2);
    out.extend_from_slice(line.as_bytes());
    out.extend_from_slice(b"\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_complete_lines_and_keeps_tail() {
        let mut lb = LineBuffer::new();
        lb.feed(b"NICK john\r\nUSER john 0 * :J");
        assert_eq!(lb.next_line(), Some(b"NICK john".to_vec()));
        assert_eq!(lb.next_line(), None);
        assert_eq!(lb.tail(), b"USER john 0 * :J");
    }

    #[test]
    fn multiple_lines_in_one_chunk() {
        let mut lb = LineBuffer::new();
        lb.feed(b"A\r\nB\r\nC");
        assert_eq!(lb.next_line(), Some(b"A".to_vec()));
        assert_eq!(lb.next_line(), Some(b"B".to_vec()));
        assert_eq!(lb.next_line(), None);
        assert_eq!(lb.tail(), b"C");
    }

    #[test]
    fn exactly_510_bytes_payload_accepted() {
        let mut lb = LineBuffer::new();
        let payload = vec![b'a'; MAX_PAYLOAD];
        lb.feed(&payload);
        lb.feed(b"\r\n");
        assert_eq!(lb.next_line(), Some(payload));
    }

    #[test]
    fn over_511_bytes_dropped() {
        let mut lb = LineBuffer::new();
        let payload = vec![b'a'; MAX_PAYLOAD + 1];
        lb.feed(&payload);
        // No terminator yet and we're already over budget: buffer was reset.
        assert!(lb.tail().is_empty());
        lb.feed(b"\r\n");
        assert_eq!(lb.next_line(), None);
    }

    #[test]
    fn framing_round_trip_accounts_for_all_bytes() {
        let mut lb = LineBuffer::new();
        let input = b"NICK a\r\nNICK b\r\ntail".to_vec();
        lb.feed(&input);
        let mut extracted = Vec::new();
        while let Some(line) = lb.next_line() {
            extracted.extend_from_slice(&line);
            extracted.extend_from_slice(b"\r\n");
        }
        extracted.extend_from_slice(lb.tail());
        assert_eq!(extracted, input);
    }
}
