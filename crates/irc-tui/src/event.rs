//! Three-level tagged event dispatcher (§4.8), grounded in `client/src/priv_event.h`'s
//! `EventType` (UI/NETWORK/SYSTEM) plus per-type sub-kind enums, and in
//! `libtiny_tui/src/lib.rs`'s central event-handling `match` for the dispatch shape.
//!
//! Events queue in a bounded FIFO; unlike the session message queues (which evict the oldest
//! entry to make room), a full event queue drops the *newest* arrival, since losing the most
//! recent keystroke/network byte is preferable to silently reordering history out from under a
//! consumer that hasn't caught up yet.

use std::collections::VecDeque;

pub const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    KeyPress(term_input::Key),
    Resize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Connected,
    Disconnected,
    LineReceived(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    Tick,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Ui(UiEvent),
    Network(NetworkEvent),
    System(SystemEvent),
}

pub struct EventQueue {
    queue: VecDeque<Event>,
    capacity: usize,
    dropped: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        EventQueue {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Returns `false` (and drops `event`) if the queue was already full.
    pub fn push(&mut self, event: Event) -> bool {
        if self.queue.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.queue.push_back(event);
        true
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut q = EventQueue::new();
        q.push(Event::System(SystemEvent::Tick));
        q.push(Event::Network(NetworkEvent::Connected));
        assert_eq!(q.pop(), Some(Event::System(SystemEvent::Tick)));
        assert_eq!(q.pop(), Some(Event::Network(NetworkEvent::Connected)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn full_queue_drops_newest() {
        let mut q = EventQueue::with_capacity(2);
        assert!(q.push(Event::System(SystemEvent::Tick)));
        assert!(q.push(Event::System(SystemEvent::Tick)));
        assert!(!q.push(Event::System(SystemEvent::Shutdown)));
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.len(), 2);
        // the oldest two entries are intact; the dropped arrival never displaced them
        assert_eq!(q.pop(), Some(Event::System(SystemEvent::Tick)));
        assert_eq!(q.pop(), Some(Event::System(SystemEvent::Tick)));
    }
}
