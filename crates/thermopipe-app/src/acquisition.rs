//! The acquisition cycle: transact, validate, decode, render, publish.

use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, warn};
use thermopipe_core::{I2cBus, PipePublisher, PublishOutcome};
use thermopipe_decode::protocol::{FRAME_LEN, N_PIXELS, PAYLOAD_LEN, READ_COMMAND, SENSOR_ADDR};
use thermopipe_decode::{pec, render_line, DecodedSample};

use crate::config::Config;

/// Run the loop until the shutdown channel fires or its sender goes away.
pub fn run(config: &Config, shutdown: &Receiver<()>) -> Result<()> {
    let bus = I2cBus::new(&config.device);
    let publisher = PipePublisher::new(&config.pipe);
    publisher
        .ensure_exists()
        .context("failed to prepare output pipe")?;

    // The sensor needs a warm-up after power-on before readings settle.
    if wait_or_shutdown(shutdown, Duration::from_millis(config.warmup_ms)) {
        return Ok(());
    }

    loop {
        match bus.read_register::<FRAME_LEN>(SENSOR_ADDR, READ_COMMAND) {
            Ok(frame) => acquire_cycle(&frame, &publisher, &config.sensor_id),
            // A failed transaction costs one cycle; the next tick retries.
            Err(err) => error!("bus transaction failed: {:#}", anyhow::Error::from(err)),
        }

        if wait_or_shutdown(shutdown, Duration::from_millis(config.cycle_ms)) {
            return Ok(());
        }
    }
}

/// One successful transaction: integrity check, decode, render, publish.
fn acquire_cycle(frame: &[u8; FRAME_LEN], publisher: &PipePublisher, sensor_id: &str) {
    // A bad PEC is reported but the frame is still decoded and published;
    // consumers see the flagged sample rather than a gap.
    if let Err(mismatch) = pec::verify(SENSOR_ADDR, frame, PAYLOAD_LEN) {
        warn!("{mismatch}");
    }

    let sample = DecodedSample::from_frame(frame, N_PIXELS);
    let line = render_line(&sample, sensor_id);
    print!("{line}");

    match publisher.publish(line.as_bytes()) {
        Ok(PublishOutcome::Delivered) => {
            debug!("sample sent to {}", publisher.path().display());
        }
        Ok(PublishOutcome::NoReader) => {
            debug!("no reader on pipe, skipping write");
        }
        Err(err) => error!("publish failed: {:#}", anyhow::Error::from(err)),
    }
}

/// Interruptible sleep; true means stop.
fn wait_or_shutdown(shutdown: &Receiver<()>, timeout: Duration) -> bool {
    match shutdown.recv_timeout(timeout) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        Err(RecvTimeoutError::Timeout) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn wait_elapses_when_nothing_is_sent() {
        let (_tx, rx) = bounded::<()>(1);
        assert!(!wait_or_shutdown(&rx, Duration::from_millis(10)));
    }

    #[test]
    fn wait_stops_on_signal() {
        let (tx, rx) = bounded(1);
        tx.send(()).unwrap();
        assert!(wait_or_shutdown(&rx, Duration::from_secs(5)));
    }

    #[test]
    fn wait_stops_when_the_handler_goes_away() {
        let (tx, rx) = bounded::<()>(1);
        drop(tx);
        assert!(wait_or_shutdown(&rx, Duration::from_secs(5)));
    }
}
