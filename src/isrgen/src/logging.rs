use std::io::Write;

/// Writes every enabled record to stderr, so log output never mixes into a listing written to stdout.
pub struct StderrLogger;

impl StderrLogger {
    pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
        static STDERR_LOGGER: StderrLogger = StderrLogger;

        log::set_logger(&STDERR_LOGGER)?;
        log::set_max_level(level);

        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();

            // Nowhere left to report a failed write to stderr.
            let _ = writeln!(
                stderr,
                "[{level}][{target}] {args}",
                level = record.level(),
                target = record.target(),
                args = record.args(),
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn reinstalling_reports_through_anyhow() {
        // Whichever call runs first installs the logger; the second always fails.
        let _ = StderrLogger::init(log::LevelFilter::Warn);
        let error = StderrLogger::init(log::LevelFilter::Warn).context("failed to install logger").unwrap_err();

        assert_eq!(error.to_string(), "failed to install logger");
        assert!(error.root_cause().is::<log::SetLoggerError>());
    }
}
