use crate::qrcode::CodeMatrix;

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

/// Light modules around the symbol, in modules.
pub const QUIET_ZONE: i32 = 4;

const DARK: Luma<u8> = Luma([0u8]);
const LIGHT: Luma<u8> = Luma([255u8]);

/*---- Rasterizer ----*/

/// A fixed-size black and white picture of a [`CodeMatrix`].
///
/// Immutable once produced; equality compares pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pixels: GrayImage,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw 8-bit luma samples, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Returns `true` when the pixel at (x, y) is black.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        *self.pixels.get_pixel(x, y) == DARK
    }

    /// Encodes this image as a PNG byte stream.
    ///
    /// # Errors
    ///
    /// Returns an `image::ImageError` if the encoder fails.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.pixels.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Converts a module grid into a `width` x `height` image.
///
/// The symbol plus its quiet zone is stretched over the output with nearest-module sampling,
/// so every pixel is either pure black (dark module) or pure white.
///
/// # Example
///
/// ```rust
/// use qrshare::{helper::rasterize, qrcode::encode};
///
/// let matrix = encode("Hello, World!").unwrap();
/// let image = rasterize(&matrix, 512, 512);
/// assert_eq!((image.width(), image.height()), (512, 512));
/// ```
pub fn rasterize(matrix: &CodeMatrix, width: u32, height: u32) -> RenderedImage {
    let total = (matrix.size() + 2 * QUIET_ZONE) as u64;
    let pixels = GrayImage::from_fn(width, height, |x, y| {
        let module_x = (u64::from(x) * total / u64::from(width)) as i32 - QUIET_ZONE;
        let module_y = (u64::from(y) * total / u64::from(height)) as i32 - QUIET_ZONE;
        if matrix.get(module_x, module_y) {
            DARK
        } else {
            LIGHT
        }
    });
    RenderedImage { pixels }
}

/*---- Terminal preview ----*/

/// Returns the matrix drawn with block characters, two columns per module, using Unix
/// newlines and `border` light modules on each side.
pub fn to_terminal_string(matrix: &CodeMatrix, border: i32) -> String {
    let border = border.max(0);
    let mut result = String::new();
    for y in -border..matrix.size() + border {
        for x in -border..matrix.size() + border {
            let c = if matrix.get(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::encode;

    #[test]
    fn test_rasterize_dimensions() {
        let matrix = encode("Hello, world!").unwrap();
        let img = rasterize(&matrix, 512, 512);
        assert_eq!((img.width(), img.height()), (512, 512));

        let img = rasterize(&matrix, 100, 40);
        assert_eq!((img.width(), img.height()), (100, 40));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let a = rasterize(&encode("hello").unwrap(), 512, 512);
        let b = rasterize(&encode("hello").unwrap(), 512, 512);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_rasterize_is_black_and_white() {
        let img = rasterize(&encode("").unwrap(), 512, 512);
        assert!(img.as_bytes().iter().all(|&p| p == 0 || p == 255));
    }

    #[test]
    fn test_rasterize_quiet_zone_and_finder() {
        let matrix = encode("").unwrap();
        // 21 modules + 8 quiet zone modules over 29 px: one pixel per module.
        let img = rasterize(&matrix, 29, 29);
        assert!(!img.is_dark(0, 0));
        assert!(!img.is_dark(3, 3));
        assert!(img.is_dark(4, 4));
        assert_eq!(img.is_dark(10, 12), matrix.get(6, 8));
    }

    #[test]
    fn test_rasterize_nearest_module() {
        let matrix = CodeMatrix::from_modules(1, vec![true]).unwrap();
        // 9 modules total, 18 px: every module spans two pixels, the dark one is 8..10.
        let img = rasterize(&matrix, 18, 18);
        assert!(!img.is_dark(7, 8));
        assert!(img.is_dark(8, 8));
        assert!(img.is_dark(9, 9));
        assert!(!img.is_dark(10, 9));
    }

    #[test]
    fn test_to_png_signature() {
        let img = rasterize(&encode("HELLO WORLD").unwrap(), 64, 64);
        let png = img.to_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]));
    }

    #[test]
    fn test_to_terminal_string() {
        let matrix = encode("HELLO WORLD").unwrap();
        let out = to_terminal_string(&matrix, 4);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 29);
        assert_eq!(lines[0].chars().count(), 58);
        assert!(lines[0].trim().is_empty());
    }
}
