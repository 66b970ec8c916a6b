use std::{fs::OpenOptions, time::Instant};

use anyhow::Context;
use fern::colors::{Color, ColoredLevelConfig};

/// Logs to stdout and to `log_file`, with the target padded to a fixed width and the
/// time since start-up in milliseconds.
pub(crate) fn setup_logging(log_file: &str, verbose: bool) -> anyhow::Result<()> {
    let colors = ColoredLevelConfig::new()
        .debug(Color::Cyan)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(log_file)
        .with_context(|| format!("Could not open log file {}", log_file))?;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let start_time = Instant::now();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let start_length = record.target().len();
            let max_len = 24;
            let (target, target_padding) = if start_length > max_len {
                (&record.target()[start_length - max_len..], "".to_string())
            } else {
                (record.target(), " ".repeat(max_len - start_length))
            };
            out.finish(format_args!(
                "[{}{}][{:>8}][{}] {}",
                target,
                target_padding,
                start_time.elapsed().as_millis(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(file)
        .apply()
        .context("Could not install logger")?;

    Ok(())
}
