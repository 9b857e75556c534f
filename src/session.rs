//! The UI shell contract.
//!
//! A [`Session`] owns the text, the debounce controller, the export pipeline and the
//! notification slot. Hosts feed it [`UiEvent`]s (directly or through [`Session::run`]) and
//! draw whatever [`Session::view`] returns. Handlers never fail: errors are logged and shown
//! as status messages.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::config::Config;
use crate::debounce::{Completion, DebounceController, Frame, Generation};
use crate::error::{Error, Result};
use crate::export::{ExportPipeline, ExportSink, ExportedArtifact, ShareRequest, ShareSink};
use crate::helper::{rasterize, RenderedImage};
use crate::notify::{Notifier, StatusMessage};
use crate::qrcode::{CodeMatrix, EncodeError, Encoder};

pub const TITLE: &str = "QR Generator";
pub const LABEL_PROMPT: &str = "enter anything to generate qr";
pub const LABEL_SHARE: &str = "tap image to share qr";

/// Events produced by the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    TextChanged(String),
    ImageActivated,
    DismissStatus,
    Quit,
}

/// Everything the host needs to draw.
#[derive(Debug, Clone)]
pub struct View {
    pub title: &'static str,
    pub label: &'static str,
    pub frame: Option<Frame>,
    pub status: Option<StatusMessage>,
}

impl View {
    pub fn image(&self) -> Option<&Arc<RenderedImage>> {
        self.frame.as_ref().map(|f| &f.image)
    }

    pub fn generation(&self) -> Option<Generation> {
        self.frame.as_ref().map(|f| f.generation)
    }
}

/// Encodes and rasterizes `text` in one step.
pub fn render_text(
    encoder: &dyn Encoder,
    text: &str,
    width: u32,
    height: u32,
) -> std::result::Result<(CodeMatrix, RenderedImage), EncodeError> {
    let matrix = encoder.encode(text)?;
    let image = rasterize(&matrix, width, height);
    Ok((matrix, image))
}

pub struct Session<S, H> {
    encoder: Arc<dyn Encoder>,
    width: u32,
    height: u32,
    caption: String,
    text: String,
    entered_text: bool,
    controller: DebounceController,
    exporter: ExportPipeline<S>,
    notifier: Notifier,
    share: H,
}

impl<S: ExportSink, H: ShareSink> Session<S, H> {
    /// Creates a session and renders the blank initial image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid configuration, or [`Error::Encode`] if
    /// the encoder rejects the empty string.
    pub fn new(config: &Config, encoder: Arc<dyn Encoder>, sink: S, share: H) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        let (matrix, image) =
            render_text(encoder.as_ref(), "", config.image_width, config.image_height)?;
        let initial = Frame::new(Generation::INITIAL, "", matrix, image);
        Ok(Self {
            encoder,
            width: config.image_width,
            height: config.image_height,
            caption: config.caption.clone(),
            text: String::new(),
            entered_text: false,
            controller: DebounceController::with_frame(config.quiet_period(), initial),
            exporter: ExportPipeline::new(sink),
            notifier: Notifier::new(config.notice_duration()),
            share,
        })
    }

    /// Accepts new input text. Any exported artifact is forgotten before the new encode runs.
    pub fn on_text_changed(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.exporter.invalidate();
        if !text.trim().is_empty() {
            self.entered_text = true;
        }
        self.controller.text_changed(text.clone(), Instant::now());
        self.text = text;
    }

    /// Exports the image on screen and hands it to the share sink.
    ///
    /// Returns the shared artifact, or `None` when a status message was posted instead.
    pub async fn on_image_activated(&mut self) -> Option<ExportedArtifact> {
        let Some(frame) = self.controller.current().cloned() else {
            tracing::warn!("image activated before anything was rendered");
            self.notifier.post(StatusMessage::something_went_wrong(), Instant::now());
            return None;
        };
        let current = self.controller.generation();
        match self.exporter.export(&frame, &self.text, current).await {
            Ok(artifact) => {
                self.share.share(&ShareRequest::new(artifact.clone(), self.caption.clone()));
                Some(artifact)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// The user pressed the status message's action button.
    pub fn dismiss_status(&mut self) {
        self.notifier.dismiss(Instant::now());
    }

    /// Runs a due encode inline and expires status messages.
    ///
    /// Returns the new frame when one was rendered.
    pub fn poll(&mut self) -> Option<Frame> {
        let now = Instant::now();
        self.notifier.tick(now);
        let ticket = self.controller.poll(now)?;
        let result = render_text(self.encoder.as_ref(), &ticket.text, self.width, self.height);
        match self.controller.complete(ticket, result) {
            Completion::Rendered(frame) => {
                self.exporter.retain(frame.generation);
                Some(frame)
            }
            Completion::Failed(err) => {
                self.report(&Error::from(err));
                None
            }
            Completion::Stale => None,
        }
    }

    /// The earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.controller.deadline(), self.notifier.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn view(&self) -> View {
        View {
            title: TITLE,
            label: self.label(),
            frame: self.controller.current().cloned(),
            status: self.notifier.current().cloned(),
        }
    }

    pub fn label(&self) -> &'static str {
        if self.entered_text {
            LABEL_SHARE
        } else {
            LABEL_PROMPT
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn controller(&self) -> &DebounceController {
        &self.controller
    }

    pub fn exporter(&self) -> &ExportPipeline<S> {
        &self.exporter
    }

    /// Processes events on the current task until [`UiEvent::Quit`] or the channel closes.
    ///
    /// `on_view` is called with the initial view and after every event or timer.
    pub async fn run<F>(&mut self, mut events: mpsc::Receiver<UiEvent>, mut on_view: F)
    where
        F: FnMut(&View),
    {
        loop {
            on_view(&self.view());
            let deadline = self.next_deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(UiEvent::TextChanged(text)) => self.on_text_changed(text),
                    Some(UiEvent::ImageActivated) => {
                        self.on_image_activated().await;
                    }
                    Some(UiEvent::DismissStatus) => self.dismiss_status(),
                    Some(UiEvent::Quit) | None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(far_future)), if deadline.is_some() => {
                    self.poll();
                }
            }
        }
        tracing::debug!(generation = %self.controller.generation(), "session ended");
    }

    fn report(&mut self, err: &Error) {
        if err.is_guard() {
            tracing::debug!(error = %err, "action refused");
        } else {
            tracing::warn!(error = %err, "pipeline failure");
        }
        self.notifier.post(err.status(), Instant::now());
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400)
}
