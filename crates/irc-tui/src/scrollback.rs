//! Fixed-capacity scrollback ring with a viewport cursor and observer notifications (§4.6),
//! grounded in `client/src/priv_scrollback.h`'s `head`/`tail`/`topLine`/`bottomLine` fields and
//! in `client/src/i_scroll_observer.h`/`i_scroll_subject.h`'s attach/detach/notify protocol,
//! which §9 says is the normative (not the older non-observer) scrollback design.
//!
//! `head`, `tail`, `topLine`, and `bottomLine` are monotonically increasing line counters (never
//! wrapped); only the backing storage index (`line_number % capacity`) wraps. This keeps the
//! invariant comparisons in §8 (`tail ≤ topLine ≤ bottomLine ≤ head`) plain integer comparisons.

pub trait ScrollObserver {
    /// Called when a new line arrives while the viewport isn't at the bottom. `message` is a
    /// short summary suitable for a status bar.
    fn notify(&mut self, message: &str);
}

pub struct Scrollback {
    buf: Vec<Option<String>>,
    capacity: usize,
    viewport_height: usize,
    head: usize,
    tail: usize,
    top_line: usize,
    bottom_line: usize,
    at_bottom: bool,
    pending: bool,
    observers: Vec<(usize, Box<dyn ScrollObserver>)>,
    next_observer_id: usize,
}

impl Scrollback {
    pub fn new(capacity: usize, viewport_height: usize) -> Self {
        Scrollback {
            buf: (0..capacity).map(|_| None).collect(),
            capacity,
            viewport_height,
            head: 0,
            tail: 0,
            top_line: 0,
            bottom_line: 0,
            at_bottom: true,
            pending: false,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    pub fn attach(&mut self, obs: Box<dyn ScrollObserver>) -> usize {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, obs));
        id
    }

    pub fn detach(&mut self, id: usize) {
        self.observers.retain(|(oid, _)| *oid != id);
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    pub fn bottom_line(&self) -> usize {
        self.bottom_line
    }

    /// Appends a rendered line. If the viewport is at the bottom it follows along; otherwise the
    /// `pending` flag is set and observers are notified once per arriving batch of lines that
    /// finds them not-yet-notified (notifying every single line while pending would spam the
    /// status bar, so this only fires on the transition from "not pending" to "pending").
    pub fn add(&mut self, line: String) {
        let was_pending = self.pending;
        let idx = self.head % self.capacity;
        self.buf[idx] = Some(line);
        self.head += 1;
        if self.head > self.capacity {
            self.tail = self.head - self.capacity;
        }

        if self.at_bottom {
            self.bottom_line = self.head;
            self.top_line = self
                .bottom_line
                .saturating_sub(self.viewport_height)
                .max(self.tail);
        } else {
            self.pending = true;
            if !was_pending {
                self.notify_observers("new messages");
            }
        }
    }

    fn notify_observers(&mut self, message: &str) {
        for (_, obs) in &mut self.observers {
            obs.notify(message);
        }
    }

    pub fn line_up(&mut self) {
        if self.top_line == self.tail {
            return;
        }
        self.top_line -= 1;
        self.bottom_line -= 1;
        self.at_bottom = false;
    }

    pub fn line_down(&mut self) {
        if self.bottom_line == self.head {
            return;
        }
        self.top_line += 1;
        self.bottom_line += 1;
        if self.bottom_line == self.head {
            self.at_bottom = true;
            self.pending = false;
        }
    }

    pub fn page_up(&mut self) {
        let remaining = self.top_line - self.tail;
        let shift = remaining.min(self.viewport_height);
        self.top_line -= shift;
        self.bottom_line -= shift;
        if shift > 0 {
            self.at_bottom = false;
        }
    }

    pub fn page_down(&mut self) {
        let remaining = self.head - self.bottom_line;
        let shift = remaining.min(self.viewport_height);
        self.top_line += shift;
        self.bottom_line += shift;
        if self.bottom_line == self.head {
            self.at_bottom = true;
            self.pending = false;
        }
    }

    pub fn to_bottom(&mut self) {
        self.bottom_line = self.head;
        self.top_line = self.bottom_line.saturating_sub(self.viewport_height).max(self.tail);
        self.at_bottom = true;
        self.pending = false;
    }

    /// Renders the current viewport, oldest first.
    pub fn viewport_lines(&self) -> Vec<&str> {
        (self.top_line..self.bottom_line)
            .filter_map(|line_no| self.buf[line_no % self.capacity].as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingObserver(Rc<RefCell<usize>>);
    impl ScrollObserver for CountingObserver {
        fn notify(&mut self, _message: &str) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn viewport_invariant_after_fill() {
        let mut sb = Scrollback::new(10, 5);
        for i in 0..5 {
            sb.add(format!("line {i}"));
        }
        assert_eq!(sb.bottom_line() - sb.top_line(), 5);
        assert_eq!(sb.viewport_lines().len(), 5);
    }

    #[test]
    fn line_up_no_op_at_top() {
        let mut sb = Scrollback::new(10, 5);
        for i in 0..5 {
            sb.add(format!("line {i}"));
        }
        let (top, bottom) = (sb.top_line(), sb.bottom_line());
        sb.line_up(); // no-op: topLine == tail (== 0)
        assert_eq!((sb.top_line(), sb.bottom_line()), (top, bottom));
    }

    #[test]
    fn scroll_pending_scenario() {
        let count = Rc::new(RefCell::new(0));
        let mut sb = Scrollback::new(10, 5);
        sb.attach(Box::new(CountingObserver(count.clone())));

        for i in 0..5 {
            sb.add(format!("line {i}"));
        }
        sb.line_up(); // no-op, already at top of available lines
        for i in 5..8 {
            sb.add(format!("line {i}")); // at bottom: viewport advances, no notify
        }
        assert_eq!(*count.borrow(), 0);

        sb.line_up();
        sb.line_up();
        assert!(!sb.pending());

        sb.add("line 8".to_owned());
        assert!(sb.pending());
        assert_eq!(*count.borrow(), 1);

        sb.add("line 9".to_owned());
        assert_eq!(*count.borrow(), 1); // still pending, no duplicate notification

        sb.to_bottom();
        assert!(!sb.pending());
    }
}
