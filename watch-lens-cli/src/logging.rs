//! Logger setup: plain messages on stderr, optionally teed to a file with
//! ANSI escapes stripped. Stdout is left to command payloads.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::LevelFilter;

use crate::error::CliError;

/// Writes to the console and to a log file. The file copy has color codes
/// removed.
struct Tee<C: Write, F: Write> {
    console: C,
    file: strip_ansi_escapes::Writer<F>,
}

impl<C: Write, F: Write> Tee<C, F> {
    fn new(console: C, file: F) -> Self {
        Self {
            console,
            file: strip_ansi_escapes::Writer::new(file),
        }
    }
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

/// Install the global logger.
///
/// `--quiet` keeps warnings and errors, `--verbose` adds debug messages with
/// timestamps. `RUST_LOG` still overrides both.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(Tee::new(io::stderr(), file))));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_strips_color_codes_from_file_copy() {
        let mut console = Vec::new();
        let mut file = Vec::new();
        {
            let mut tee = Tee::new(&mut console, &mut file);
            tee.write_all(b"\x1b[32mok\x1b[0m done\n").unwrap();
            tee.flush().unwrap();
        }
        assert_eq!(console, b"\x1b[32mok\x1b[0m done\n");
        assert_eq!(String::from_utf8(file).unwrap(), "ok done\n");
    }
}
