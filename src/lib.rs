//! # qrshare
//!
//! A live QR code generator: text goes in as the user types, a fixed-size black and white
//! image comes out once typing pauses, and tapping the image exports it as a PNG and hands it
//! to a share target.
//!
//! ## Features
//!
//! - Debounced encoding: one encode per quiet period (500 ms by default), latest text wins.
//! - Stale results are dropped by generation, so a slow encode never overwrites newer text.
//! - Encode failures keep the previous image on screen and post a status message.
//! - Export is memoized per rendered frame and forgotten on the next keystroke.
//! - Single-slot, auto-expiring status messages.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! Drive a session by hand:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qrshare::{
//!     config::Config,
//!     export::{FileExportSink, ShareRequest, ShareSink},
//!     qrcode::QrEncoder,
//!     session::Session,
//! };
//!
//! struct Print;
//!
//! impl ShareSink for Print {
//!     fn share(&self, request: &ShareRequest) {
//!         println!("{} ({})", request.artifact.uri(), request.caption);
//!     }
//! }
//!
//! # async fn demo() -> qrshare::Result<()> {
//! let config = Config::default();
//! let sink = FileExportSink::new(config.export_root());
//! let mut session = Session::new(&config, Arc::new(QrEncoder), sink, Print)?;
//!
//! session.on_text_changed("hello");
//! tokio::time::sleep(config.quiet_period()).await;
//! session.poll();
//! session.on_image_activated().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: text to QR module grid.
//! - [`helper`]: rasterizing, PNG bytes, terminal preview.
//! - [`debounce`]: the debounced encode state machine.
//! - [`export`]: memoized PNG export and the share capability.
//! - [`notify`]: status messages.
//! - [`session`]: the event contract tying everything together.

#![forbid(unsafe_code)]

pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod helper;
pub mod logging;
pub mod notify;
pub mod qrcode;
pub mod session;

pub use error::{Error, Result};
