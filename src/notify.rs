//! Single-slot status messages.
//!
//! At most one [`StatusMessage`] is shown at a time. A message posted while another is
//! showing waits in a one-element queue; a newer pending message replaces an older one.

use std::time::Duration;
use tokio::time::Instant;

/// Default display duration, matching a short platform snackbar.
pub const DEFAULT_DISPLAY: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A transient user-facing message with one action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub action_label: String,
}

impl StatusMessage {
    pub fn new(
        text: impl Into<String>,
        severity: Severity,
        action_label: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            severity,
            action_label: action_label.into(),
        }
    }

    /// Shown when an action needs input text first.
    pub fn enter_something() -> Self {
        Self::new("please enter something in text field", Severity::Info, "okay")
    }

    /// Shown for any failure; the cause only goes to the log.
    pub fn something_went_wrong() -> Self {
        Self::new("oh no! some bad things happened.", Severity::Error, "dismiss")
    }
}

#[derive(Debug)]
struct Active {
    message: StatusMessage,
    expires_at: Instant,
}

/// The notification slot.
#[derive(Debug)]
pub struct Notifier {
    display: Duration,
    active: Option<Active>,
    pending: Option<StatusMessage>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY)
    }
}

impl Notifier {
    pub fn new(display: Duration) -> Self {
        Self {
            display,
            active: None,
            pending: None,
        }
    }

    /// Queues `message`. It shows at once when the slot is free.
    pub fn post(&mut self, message: StatusMessage, now: Instant) {
        self.tick(now);
        if self.active.is_none() {
            self.show(message, now);
        } else if let Some(dropped) = self.pending.replace(message) {
            tracing::debug!(text = %dropped.text, "pending status message superseded");
        }
    }

    /// Dismisses the active message via its action button.
    pub fn dismiss(&mut self, now: Instant) {
        if self.active.take().is_some() {
            self.promote(now);
        }
    }

    /// Expires the active message once its display time has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.active.as_ref().is_some_and(|a| now >= a.expires_at) {
            self.active = None;
            self.promote(now);
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.active.as_ref().map(|a| &a.message)
    }

    pub fn pending(&self) -> Option<&StatusMessage> {
        self.pending.as_ref()
    }

    /// When the active message expires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.expires_at)
    }

    fn promote(&mut self, now: Instant) {
        if let Some(next) = self.pending.take() {
            self.show(next, now);
        }
    }

    fn show(&mut self, message: StatusMessage, now: Instant) {
        tracing::debug!(
            text = %message.text,
            severity = ?message.severity,
            "showing status message"
        );
        self.active = Some(Active {
            message,
            expires_at: now + self.display,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(text: &str) -> StatusMessage {
        StatusMessage::new(text, Severity::Info, "okay")
    }

    #[test]
    fn test_post_shows_immediately() {
        let now = Instant::now();
        let mut notifier = Notifier::default();
        notifier.post(info("a"), now);
        assert_eq!(notifier.current().map(|m| m.text.as_str()), Some("a"));
        assert_eq!(notifier.next_deadline(), Some(now + DEFAULT_DISPLAY));
    }

    #[test]
    fn test_expires_after_display() {
        let now = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(1));
        notifier.post(info("a"), now);
        notifier.tick(now + Duration::from_millis(999));
        assert!(notifier.current().is_some());
        notifier.tick(now + Duration::from_secs(1));
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_waits_for_active_then_shows_latest_pending() {
        let now = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(1));
        notifier.post(info("a"), now);
        notifier.post(info("b"), now);
        notifier.post(info("c"), now);
        assert_eq!(notifier.current().unwrap().text, "a");
        assert_eq!(notifier.pending().unwrap().text, "c");

        let later = now + Duration::from_secs(1);
        notifier.tick(later);
        assert_eq!(notifier.current().unwrap().text, "c");
        assert_eq!(notifier.next_deadline(), Some(later + Duration::from_secs(1)));
        assert!(notifier.pending().is_none());
    }

    #[test]
    fn test_dismiss_promotes_pending() {
        let now = Instant::now();
        let mut notifier = Notifier::default();
        notifier.post(StatusMessage::enter_something(), now);
        notifier.post(StatusMessage::something_went_wrong(), now);
        notifier.dismiss(now);
        assert_eq!(notifier.current(), Some(&StatusMessage::something_went_wrong()));
        notifier.dismiss(now);
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_post_after_expiry_shows_at_once() {
        let now = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(1));
        notifier.post(info("a"), now);
        notifier.post(info("b"), now + Duration::from_secs(2));
        assert_eq!(notifier.current().unwrap().text, "b");
    }
}
