//! Debounced encoding state machine.
//!
//! Text changes do not encode right away. Each change stamps a new [`Generation`] and arms a
//! deadline one quiet period ahead; only when the deadline passes without a newer change is an
//! [`EncodeTicket`] handed out. Results carrying an older generation are dropped, so the latest
//! text always wins regardless of completion order.
//!
//! The controller never reads the clock itself: callers pass `now`, which keeps it
//! deterministic under test and lets the session drive it from a timer.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::helper::RenderedImage;
use crate::qrcode::{CodeMatrix, EncodeError};

/// Default quiet period before an encode runs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Identifies one accepted text value. Later changes get larger generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What is on screen: an encoded and rasterized text snapshot.
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: Generation,
    pub text: String,
    pub matrix: Arc<CodeMatrix>,
    pub image: Arc<RenderedImage>,
}

impl Frame {
    pub fn new(
        generation: Generation,
        text: impl Into<String>,
        matrix: CodeMatrix,
        image: RenderedImage,
    ) -> Self {
        Self {
            generation,
            text: text.into(),
            matrix: Arc::new(matrix),
            image: Arc::new(image),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing displayed yet and nothing pending.
    Idle,
    /// Waiting for the quiet period to elapse.
    PendingEncode { text: String, deadline: Instant },
    /// An encode for `text` has been handed out.
    Encoding { text: String },
    /// The output slot is up to date with the last accepted text (or kept the previous
    /// image after a failed encode).
    Rendered,
}

/// Permission to encode one text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeTicket {
    pub generation: Generation,
    pub text: String,
}

/// Outcome of [`DebounceController::complete`].
#[derive(Debug)]
pub enum Completion {
    /// The result was installed in the output slot.
    Rendered(Frame),
    /// Encoding failed; the previous frame stays on screen.
    Failed(EncodeError),
    /// A newer text arrived meanwhile; the result was discarded.
    Stale,
}

#[derive(Debug)]
pub struct DebounceController {
    quiet_period: Duration,
    state: DebounceState,
    generation: Generation,
    current: Option<Frame>,
    encodes: u64,
}

impl DebounceController {
    /// Creates an idle controller with an empty output slot.
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: DebounceState::Idle,
            generation: Generation::INITIAL,
            current: None,
            encodes: 0,
        }
    }

    /// Creates a controller that already displays `initial`.
    pub fn with_frame(quiet_period: Duration, initial: Frame) -> Self {
        Self {
            quiet_period,
            state: DebounceState::Rendered,
            generation: initial.generation,
            current: Some(initial),
            encodes: 0,
        }
    }

    /// Accepts a new text value and (re)arms the deadline.
    pub fn text_changed(&mut self, text: impl Into<String>, now: Instant) -> Generation {
        self.generation = self.generation.next();
        let deadline = now + self.quiet_period;
        if let DebounceState::Encoding { text: in_flight } = &self.state {
            tracing::debug!(text = %in_flight, "in-flight encode superseded");
        }
        self.state = DebounceState::PendingEncode {
            text: text.into(),
            deadline,
        };
        tracing::trace!(generation = %self.generation, "encode scheduled");
        self.generation
    }

    /// The time at which the pending text becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::PendingEncode { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Hands out an encode ticket once the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<EncodeTicket> {
        let text = match &self.state {
            DebounceState::PendingEncode { text, deadline } if now >= *deadline => text.clone(),
            _ => return None,
        };
        self.state = DebounceState::Encoding { text: text.clone() };
        self.encodes += 1;
        tracing::debug!(generation = %self.generation, "encode due");
        Some(EncodeTicket {
            generation: self.generation,
            text,
        })
    }

    /// Feeds back the result of an encode handed out by [`poll`](Self::poll).
    pub fn complete(
        &mut self,
        ticket: EncodeTicket,
        result: Result<(CodeMatrix, RenderedImage), EncodeError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.generation,
                "discarding stale encode result"
            );
            return Completion::Stale;
        }
        self.state = DebounceState::Rendered;
        match result {
            Ok((matrix, image)) => {
                let frame = Frame::new(ticket.generation, ticket.text, matrix, image);
                self.current = Some(frame.clone());
                Completion::Rendered(frame)
            }
            Err(err) => {
                tracing::warn!(
                    generation = %ticket.generation,
                    error = %err,
                    "encode failed, keeping previous image"
                );
                Completion::Failed(err)
            }
        }
    }

    /// The frame in the output slot.
    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// Generation of the last accepted text.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Number of tickets handed out so far.
    pub fn encodes_started(&self) -> u64 {
        self.encodes
    }
}
