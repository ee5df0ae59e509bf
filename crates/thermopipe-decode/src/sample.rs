//! Fixed-point sample decoding.

use chrono::{DateTime, Local};

/// One decoded acquisition: the PTAT reference plus the row-major pixel
/// grid, stamped with the wall-clock capture time.
#[derive(Debug, Clone)]
pub struct DecodedSample {
    /// Reference (PTAT) temperature in degrees Celsius.
    pub ptat: f64,
    /// Per-pixel temperatures in degrees Celsius, in wire order.
    pub pixels: Vec<f64>,
    /// Millisecond-resolution capture time.
    pub captured_at: DateTime<Local>,
}

/// Assemble the little-endian signed 16-bit value at `offset`.
fn conv_s16_le(frame: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([frame[offset], frame[offset + 1]])
}

impl DecodedSample {
    /// Decode a full-length frame. The layout is fixed: the PTAT word at
    /// offset 0, then `pixel_count` pixel words; raw values are tenths of
    /// a degree. Integrity checking happens upstream, not here.
    pub fn from_frame(frame: &[u8], pixel_count: usize) -> Self {
        let ptat = f64::from(conv_s16_le(frame, 0)) / 10.0;
        let pixels = (0..pixel_count)
            .map(|i| f64::from(conv_s16_le(frame, 2 + 2 * i)) / 10.0)
            .collect();
        Self {
            ptat,
            pixels,
            captured_at: Local::now(),
        }
    }
}
