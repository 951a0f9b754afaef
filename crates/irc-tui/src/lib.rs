//! Client-side terminal UI: scrollback, line editor, and event dispatch (§4.6-§4.8), rendered
//! with `termbox_simple` and fed keyboard events via `term-input`, the way
//! `libtiny_tui/src/lib.rs` wires its own `msg_area`/`input_area`/`Notifier` together.

pub mod editor;
pub mod event;
pub mod scrollback;

pub use editor::LineEditor;
pub use event::{Event, EventQueue, NetworkEvent, SystemEvent, UiEvent};
pub use scrollback::{Scrollback, ScrollObserver};

use termbox_simple::Termbox;

const FG_DEFAULT: u16 = 0;
const BG_DEFAULT: u16 = 0;
const FG_STATUS: u16 = 3;

/// Owns the terminal, the scrollback for the active target, and the command line editor. One
/// `Tui` exists per client process; which channel/nick's scrollback it's pointed at is switched
/// by the caller (`irc-client`) handing it a different `Scrollback`.
pub struct Tui {
    tb: Termbox,
    editor: LineEditor,
    events: EventQueue,
    status_pending: bool,
}

impl Tui {
    pub fn new() -> std::io::Result<Self> {
        Ok(Tui {
            tb: Termbox::init()?,
            editor: LineEditor::new(),
            events: EventQueue::new(),
            status_pending: false,
        })
    }

    pub fn editor_mut(&mut self) -> &mut LineEditor {
        &mut self.editor
    }

    pub fn width(&self) -> i32 {
        self.tb.width()
    }

    pub fn height(&self) -> i32 {
        self.tb.height()
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn mark_pending(&mut self) {
        self.status_pending = true;
    }

    pub fn clear_pending(&mut self) {
        self.status_pending = false;
    }

    /// Marks the terminal size as stale; the next `draw` re-queries it. Call on `SIGWINCH`.
    pub fn resize(&mut self) {
        self.tb.resize();
    }

    /// Redraws the message viewport, a one-line status bar, and the prompt.
    pub fn draw(&mut self, scrollback: &Scrollback, server_name: &str) {
        self.tb.clear();
        let height = self.tb.height();
        let width = self.tb.width();

        let lines = scrollback.viewport_lines();
        let msg_rows = (height - 2).max(0) as usize;
        for (row, line) in lines.iter().rev().take(msg_rows).rev().enumerate() {
            for (col, ch) in line.chars().take(width as usize).enumerate() {
                self.tb.change_cell(col as i32, row as i32, ch, FG_DEFAULT, BG_DEFAULT);
            }
        }

        let status_row = height - 2;
        let status = if self.status_pending {
            format!("{server_name} -- new messages")
        } else {
            server_name.to_owned()
        };
        for (col, ch) in status.chars().take(width as usize).enumerate() {
            self.tb.change_cell(col as i32, status_row, ch, FG_STATUS, BG_DEFAULT);
        }

        let prompt_row = height - 1;
        let prompt = format!("> {}", self.editor.buffer());
        for (col, ch) in prompt.chars().take(width as usize).enumerate() {
            self.tb.change_cell(col as i32, prompt_row, ch, FG_DEFAULT, BG_DEFAULT);
        }
        self.tb
            .set_cursor(Some((self.editor.cursor() as u16, prompt_row as u16)));

        self.tb.present();
    }
}
