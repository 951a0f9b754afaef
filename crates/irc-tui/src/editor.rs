//! Single-line command editor with bounded history (§4.7), grounded in
//! `client/src/priv_line_editor.h`'s `front`/`back` history queues and `charCount`/`cursor`
//! fields, and in `libtiny_tui/src/input_area/input_line.rs`'s cursor-clamping style.
//!
//! `back` is the authoritative, capacity-bounded command history (oldest evicted first). `front`
//! is the not-yet-browsed tail of `back`; pressing "previous" pops the newest unbrowsed entry off
//! `front` onto `browsed` and loads it into the buffer, pressing "next" pops `browsed` back onto
//! `front` and restores whatever's now on top (or clears the buffer if `browsed` is empty).
//! Editing the live buffer never mutates `back` — only ENTER commits.

use std::collections::VecDeque;

pub const PROMPT_SIZE: usize = 2;
pub const HISTORY_CAPACITY: usize = 30;

pub struct LineEditor {
    history_capacity: usize,
    back: VecDeque<String>,
    front: Vec<String>,
    browsed: Vec<String>,
    buf: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(history_capacity: usize) -> Self {
        LineEditor {
            history_capacity,
            back: VecDeque::new(),
            front: Vec::new(),
            browsed: Vec::new(),
            buf: Vec::new(),
            cursor: PROMPT_SIZE,
        }
    }

    pub fn char_count(&self) -> usize {
        self.buf.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn buffer(&self) -> String {
        self.buf.iter().collect()
    }

    fn set_buffer(&mut self, s: &str) {
        self.buf = s.chars().collect();
        self.cursor = PROMPT_SIZE + self.buf.len();
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor - PROMPT_SIZE;
        self.buf.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == PROMPT_SIZE {
            return;
        }
        let at = self.cursor - PROMPT_SIZE - 1;
        self.buf.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        let at = self.cursor - PROMPT_SIZE;
        if at < self.buf.len() {
            self.buf.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > PROMPT_SIZE {
            self.cursor -= 1;
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < PROMPT_SIZE + self.buf.len() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = PROMPT_SIZE;
    }

    pub fn end(&mut self) {
        self.cursor = PROMPT_SIZE + self.buf.len();
    }

    /// Reloads the browse state from `back`: `front` becomes a fresh oldest-first mirror and
    /// `browsed` is emptied. Called after ENTER commits a new entry, and once up front at
    /// construction time.
    fn reload(&mut self) {
        self.front = self.back.iter().cloned().collect();
        self.browsed.clear();
    }

    /// UP: moves one entry further back in history.
    pub fn history_previous(&mut self) {
        if let Some(entry) = self.front.pop() {
            self.browsed.push(entry.clone());
            self.set_buffer(&entry);
        }
    }

    /// DOWN: moves one entry forward in history, clearing the buffer once past the newest entry.
    pub fn history_next(&mut self) {
        if let Some(entry) = self.browsed.pop() {
            self.front.push(entry);
            match self.browsed.last() {
                Some(prev) => self.set_buffer(&prev.clone()),
                None => self.set_buffer(""),
            }
        }
    }

    /// Commits the current buffer as a new history entry (if non-empty) and clears the live
    /// buffer, returning the committed line. Evicts the oldest entry once `back` is at capacity.
    pub fn commit(&mut self) -> String {
        let line: String = self.buf.iter().collect();
        if !line.is_empty() {
            if self.back.len() == self.history_capacity {
                self.back.pop_front();
            }
            self.back.push_back(line.clone());
        }
        self.set_buffer("");
        self.reload();
        line
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_cursor_invariant() {
        let mut ed = LineEditor::new();
        for c in "NICK a".chars() {
            ed.insert_char(c);
        }
        assert_eq!(ed.buffer(), "NICK a");
        assert!(ed.cursor() >= PROMPT_SIZE && ed.cursor() <= PROMPT_SIZE + ed.char_count());
    }

    #[test]
    fn backspace_and_delete() {
        let mut ed = LineEditor::new();
        for c in "NICK".chars() {
            ed.insert_char(c);
        }
        ed.backspace();
        assert_eq!(ed.buffer(), "NIC");
        ed.home();
        ed.delete();
        assert_eq!(ed.buffer(), "IC");
    }

    #[test]
    fn history_browse_scenario() {
        let mut ed = LineEditor::new();
        for c in "NICK a".chars() {
            ed.insert_char(c);
        }
        ed.commit();
        for c in "NICK b".chars() {
            ed.insert_char(c);
        }
        ed.commit();

        ed.history_previous();
        assert_eq!(ed.buffer(), "NICK b");
        ed.history_previous();
        assert_eq!(ed.buffer(), "NICK a");
        ed.history_next();
        assert_eq!(ed.buffer(), "NICK b");
        ed.history_next();
        assert_eq!(ed.buffer(), "");
    }

    #[test]
    fn history_eviction_bounded() {
        let mut ed = LineEditor::with_capacity(2);
        for cmd in ["NICK a", "NICK b", "NICK c"] {
            for c in cmd.chars() {
                ed.insert_char(c);
            }
            ed.commit();
        }
        ed.history_previous();
        ed.history_previous();
        assert_eq!(ed.buffer(), "NICK b");
        ed.history_previous(); // no more history beyond capacity
        assert_eq!(ed.buffer(), "NICK b");
    }

    #[test]
    fn editing_does_not_mutate_history() {
        let mut ed = LineEditor::new();
        for c in "NICK a".chars() {
            ed.insert_char(c);
        }
        ed.commit();
        ed.history_previous();
        ed.insert_char('!');
        ed.history_next();
        ed.history_previous();
        assert_eq!(ed.buffer(), "NICK a");
    }
}
