//! User-interface capabilities the session layer drives.
//!
//! The session layer never renders anything itself. It instructs a
//! [`Navigator`] to change location and hands transient failure messages to
//! a [`Notifier`]. Both are injected so that redirects and messages are
//! observable outputs in tests.

/// The UI's navigation mechanism.
pub trait Navigator: Send + Sync {
    /// Move the UI to `target` (a route path such as `/login`).
    fn go_to(&self, target: &str);
}

/// Sink for transient, user-visible failure messages.
pub trait Notifier: Send + Sync {
    /// Display an error message.
    fn error(&self, message: &str);
}

/// A navigator that records every instruction it receives.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingNavigator {
    /// Every target passed to [`Navigator::go_to`], oldest first.
    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }

    /// The most recent target, if any.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.visits.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Navigator for RecordingNavigator {
    fn go_to(&self, target: &str) {
        self.visits.lock().push(target.to_string());
    }
}

/// A notifier that records every message it receives.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingNotifier {
    /// Every message displayed, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
