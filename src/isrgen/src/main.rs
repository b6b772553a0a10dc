#![deny(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::pedantic)]

#[macro_use]
extern crate log;

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use isrgen::{Config, Listing, asm::Syntax};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about)]
struct Options {
    /// File to write the listing to, instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write a C header describing the frame the handler receives.
    #[arg(long)]
    header: Option<PathBuf>,

    /// TOML file to read the generator configuration from.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Assembler dialect of the listing.
    #[arg(value_enum, long)]
    syntax: Option<Syntax>,

    /// Name of the exported stub address table.
    #[arg(long)]
    table: Option<String>,

    /// Label of the shared trampoline.
    #[arg(long)]
    common: Option<String>,

    /// External handler the trampoline calls.
    #[arg(long)]
    handler: Option<String>,

    /// Prefix of the per-vector stub labels.
    #[arg(long)]
    stub_prefix: Option<String>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    dump_config: bool,

    /// Increase logging verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Options {
    /// Defaults, overlaid by the config file (if any), overlaid by flags.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("failed reading config file `{}`", path.display()))?;
                Config::from_toml(&source).with_context(|| format!("invalid config file `{}`", path.display()))?
            }

            None => Config::default(),
        };

        if let Some(syntax) = self.syntax {
            config.syntax = syntax;
        }
        if let Some(table) = &self.table {
            config.symbols.table.clone_from(table);
        }
        if let Some(common) = &self.common {
            config.symbols.common.clone_from(common);
        }
        if let Some(handler) = &self.handler {
            config.symbols.handler.clone_from(handler);
        }
        if let Some(stub_prefix) = &self.stub_prefix {
            config.symbols.stub_prefix.clone_from(stub_prefix);
        }

        Ok(config)
    }

    fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let options = Options::parse();

    logging::StderrLogger::init(options.log_level()).with_context(|| "failed to install logger")?;

    let config = options.config()?;
    if options.dump_config {
        print!("{}", config.to_toml().with_context(|| "failed serializing configuration")?);
        return Ok(());
    }

    let listing = Listing::generate(&config).with_context(|| "failed to generate interrupt entry code")?;

    match &options.output {
        Some(path) => write_file(path, listing.to_string())?,
        None => print!("{listing}"),
    }

    if let Some(path) = &options.header {
        let frame = listing.frame();
        let header = frame.c_header(&config.frame_struct).with_context(|| "invalid frame struct name")?;
        write_file(path, header.to_string())?;
    }

    Ok(())
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed writing `{}`", path.display()))?;
    info!("wrote `{}`", path.display());

    Ok(())
}
