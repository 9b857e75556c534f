//! Text to QR module grid.
//!
//! This module adapts the [`qrcodegen`] encoder to the pipeline. It supports QR Code Model 2,
//! versions 1 to 40, at a fixed `Low` error correction level, and hands back an owned
//! [`CodeMatrix`] that the rasterizer can sample without borrowing encoder buffers.
//!
//! # Example
//!
//! ```rust
//! use qrshare::qrcode::encode;
//!
//! let matrix = encode("Hello, World!").unwrap();
//! assert_eq!(matrix.size(), 21);
//! assert!(matrix.get(0, 0)); // finder pattern corner
//! assert!(!matrix.get(-1, -1)); // quiet zone
//! ```

use qrcodegen::{DataTooLong, QrCode, QrCodeEcc};
use thiserror::Error;

/// Error correction level used for every symbol.
pub const ERROR_CORRECTION: QrCodeEcc = QrCodeEcc::Low;

/// An immutable square grid of dark (`true`) and light (`false`) modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatrix {
    /// Width and height in modules, between 21 and 177 inclusive.
    size: i32,
    /// Row-major module colors.
    modules: Vec<bool>,
}

impl CodeMatrix {
    /// Builds a matrix from row-major modules.
    ///
    /// Returns `None` when `modules.len()` is not `size * size`.
    pub fn from_modules(size: i32, modules: Vec<bool>) -> Option<Self> {
        let side = usize::try_from(size).ok()?;
        (side.checked_mul(side)? == modules.len()).then_some(Self { size, modules })
    }

    fn from_qr(qr: &QrCode) -> Self {
        let size = qr.size();
        let mut modules = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                modules.push(qr.get_module(x, y));
            }
        }
        Self { size, modules }
    }

    /// Returns the width and height of this matrix, measured in modules.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns the color of the module at the given coordinates, which is `false` for light
    /// or `true` for dark.
    ///
    /// The top left corner has the coordinates (x=0, y=0). If the given coordinates are out of
    /// bounds, then `false` (light) is returned, which makes the quiet zone free to sample.
    pub fn get(&self, x: i32, y: i32) -> bool {
        if !(0..self.size).contains(&x) || !(0..self.size).contains(&y) {
            return false;
        }
        self.modules[(y * self.size + x) as usize]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

/// Failure to turn text into a QR symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The text holds a character the pipeline refuses to encode.
    #[error("unsupported character {ch:?} at index {index}")]
    UnsupportedCharacter { ch: char, index: usize },

    /// The data does not fit in the largest symbol at the chosen error correction level.
    #[error("text of {len} bytes exceeds QR capacity")]
    CapacityExceeded { len: usize },
}

/// Something that turns text into a [`CodeMatrix`].
///
/// The session receives its encoder through this trait so hosts and tests can wrap or
/// replace the default [`QrEncoder`].
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<CodeMatrix, EncodeError>;
}

/// The default encoder, backed by `qrcodegen`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl Encoder for QrEncoder {
    fn encode(&self, text: &str) -> Result<CodeMatrix, EncodeError> {
        encode(text)
    }
}

/// Encodes a text string into a QR module grid.
///
/// Blank text is valid and yields the deterministic version 1 symbol for empty data.
///
/// # Errors
///
/// - [`EncodeError::UnsupportedCharacter`] for control characters other than tab, CR and LF.
/// - [`EncodeError::CapacityExceeded`] when the text is too long for version 40.
pub fn encode(text: &str) -> Result<CodeMatrix, EncodeError> {
    if let Some((index, ch)) = text.char_indices().find(|&(_, c)| !is_supported(c)) {
        return Err(EncodeError::UnsupportedCharacter { ch, index });
    }

    let qr = QrCode::encode_text(text, ERROR_CORRECTION).map_err(|err| match err {
        DataTooLong::SegmentTooLong | DataTooLong::DataOverCapacity(..) => {
            EncodeError::CapacityExceeded { len: text.len() }
        }
    })?;
    tracing::trace!(version = qr.version().value(), size = qr.size(), "encoded qr symbol");
    Ok(CodeMatrix::from_qr(&qr))
}

/// Characters accepted by [`encode`]: everything except control characters, with the
/// exception of common whitespace.
pub fn is_supported(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty() {
        let matrix = encode("").unwrap();
        assert_eq!(matrix.size(), 21);
        assert!(matrix.dark_count() > 0);
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode("hello").unwrap(), encode("hello").unwrap());
        assert_ne!(encode("hello").unwrap(), encode("world").unwrap());
    }

    #[test]
    fn test_encode_unicode() {
        assert!(encode("héllo wörld ✓").is_ok());
        assert!(encode("line one\nline two\ttab").is_ok());
    }

    #[test]
    fn test_rejects_control_characters() {
        assert_eq!(
            encode("ab\u{7}c"),
            Err(EncodeError::UnsupportedCharacter { ch: '\u{7}', index: 2 })
        );
        assert!(encode("\0").is_err());
    }

    #[test]
    fn test_capacity_exceeded() {
        let text = "x".repeat(3000);
        assert_eq!(encode(&text), Err(EncodeError::CapacityExceeded { len: 3000 }));
    }

    #[test]
    fn test_get_out_of_bounds_is_light() {
        let matrix = encode("HELLO WORLD").unwrap();
        assert!(!matrix.get(-1, 0));
        assert!(!matrix.get(0, matrix.size()));
    }

    #[test]
    fn test_from_modules_checks_length() {
        assert!(CodeMatrix::from_modules(2, vec![true; 4]).is_some());
        assert!(CodeMatrix::from_modules(2, vec![true; 3]).is_none());
        assert!(CodeMatrix::from_modules(-1, vec![]).is_none());
    }
}
