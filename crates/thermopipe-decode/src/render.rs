//! Text rendering of decoded samples.

use crate::sample::DecodedSample;

/// Render the single publishable line for `sample`, newline terminated.
/// One decimal digit throughout; Rust float formatting is locale
/// independent, so the decimal separator is always `.`.
pub fn render_line(sample: &DecodedSample, sensor_id: &str) -> String {
    let mut line = format!(
        "id: {}, date: {}, time: {}, PTAT: {:.1} [degC], Temperature: ",
        sensor_id,
        sample.captured_at.format("%Y-%m-%d"),
        sample.captured_at.format("%H:%M:%S:%3f"),
        sample.ptat,
    );
    for (i, temp) in sample.pixels.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        line.push_str(&format!("{temp:.1}"));
    }
    line.push_str(" [degC]\n");
    line
}
