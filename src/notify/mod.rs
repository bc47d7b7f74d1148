//! Audio cue on view growth.
//!
//! The terminal bell is the cue; the trait lets tests and `--no-bell`
//! substitute their own behaviour.

use std::io::{self, Write};
use tracing::debug;

/// Reacts to a grown view total.
pub trait Notifier {
    fn notify(&mut self, previous: u64, current: u64);
}

/// Rings the terminal bell (ASCII BEL).
///
/// Writes to stderr by default so JSON output on stdout stays clean.
pub struct BellNotifier<W: Write = io::Stderr> {
    out: W,
}

impl BellNotifier {
    pub fn terminal() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> BellNotifier<W> {
    #[allow(dead_code)] // Binary only rings stderr; tests capture
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Notifier for BellNotifier<W> {
    fn notify(&mut self, previous: u64, current: u64) {
        debug!("Ringing bell: {} -> {}", previous, current);
        // A closed terminal is not worth halting the monitor over.
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            debug!("Bell write failed: {}", e);
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, previous: u64, current: u64) {
        (**self).notify(previous, current)
    }
}

/// Does nothing.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&mut self, _previous: u64, _current: u64) {}
}
