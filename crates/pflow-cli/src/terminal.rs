//! Terminal implementations of the UI capabilities.
//!
//! There is no screen to switch, so the navigator only remembers where the
//! UI would be and reports moves on stderr. Messages go to stderr as well,
//! leaving stdout to command output.

use std::io::Write;

use parking_lot::Mutex;
use pflow_core::{Navigator, Notifier};

/// Remembers the current location and reports every move.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    location: Mutex<Option<String>>,
    quiet: bool,
}

impl TerminalNavigator {
    /// A navigator that prints each move.
    pub fn new() -> Self {
        Self::default()
    }

    /// A navigator that only records.
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// The last location navigated to.
    pub fn location(&self) -> Option<String> {
        self.location.lock().clone()
    }
}

impl Navigator for TerminalNavigator {
    fn go_to(&self, target: &str) {
        tracing::debug!(target_path = target, "Location changed");
        *self.location.lock() = Some(target.to_string());
        if !self.quiet {
            let _ = writeln!(std::io::stderr(), "-> {target}");
        }
    }
}

/// Writes transient messages to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, message: &str) {
        let _ = writeln!(std::io::stderr(), "error: {message}");
    }
}
