//! tracing-subscriber setup

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

/// Log level for a `-v` count
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Send logs to `file`. The interactive view owns the screen, so this is the
/// only place it can log to.
pub fn init_file(file: &Path, verbosity: u8) -> io::Result<()> {
    let file = File::create(file)?;
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Send logs to stderr, for the one-shot commands
pub fn init_stderr(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_writer(io::stderr)
        .try_init();
}
