use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming};
use log::info;

mod acquisition;
mod config;

fn main() -> Result<()> {
    let config = config::Config::load().context("failed to load configuration")?;

    // Leveled output goes to a date-stamped file under the configured
    // directory; errors are echoed to stderr as well. The handle lives
    // until shutdown so buffered records are flushed on exit.
    let logger = Logger::try_with_str("info")
        .context("invalid log specification")?
        .log_to_file(
            FileSpec::default()
                .directory(&config.log_dir)
                .basename("thermopipe"),
        )
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(7),
        )
        .duplicate_to_stderr(Duplicate::Error)
        .start()
        .context("failed to start logger")?;

    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .context("failed to install signal handler")?;

    info!(
        "starting acquisition on {} -> {}",
        config.device, config.pipe
    );
    acquisition::run(&config, &shutdown_rx)?;
    info!("acquisition stopped");

    logger.flush();
    Ok(())
}
