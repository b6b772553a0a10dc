use anyhow::{Context, Result};
use clap::ValueEnum;
use isrgen::asm::Syntax;
use xshell::{cmd, Shell};

pub static OUTPUT_DIR: &str = "build/";
static DEBUG_DIR: &str = ".debug/";

static LISTING_PATH: &str = "build/isr.S";
static HEADER_PATH: &str = "build/interrupt_frame.h";
static OBJECT_PATH: &str = "build/isr.o";

#[derive(clap::Parser)]
#[group(skip)]
pub struct Options {
    /// Assembler dialect of the generated listing, overriding the config file.
    #[arg(value_enum, long)]
    syntax: Option<Syntax>,

    /// Generator configuration file to pass through.
    #[arg(long)]
    config: Option<String>,

    /// Whether to assemble the listing into an object file.
    #[arg(long)]
    assemble: bool,

    /// Whether to produce a disassembly file (implies `--assemble`).
    #[arg(long)]
    disassemble: bool,

    /// Whether to output the object's symbol table to a file (implies `--assemble`).
    #[arg(long)]
    readelf: bool,
}

pub fn generate(sh: &Shell, options: Options) -> Result<()> {
    crate::create_path_if_not_exists(sh, OUTPUT_DIR)?;

    let syntax = options.syntax.and_then(|syntax| syntax.to_possible_value());
    let syntax_args = syntax.iter().flat_map(|value| ["--syntax", value.get_name()]);
    let config_args = options.config.iter().flat_map(|path| ["--config", path.as_str()]);
    cmd!(
        sh,
        "
        cargo run --quiet -p isrgen --
            {syntax_args...}
            --output {LISTING_PATH}
            --header {HEADER_PATH}
            {config_args...}
        "
    )
    .run()
    .with_context(|| "interrupt entry generation failed")?;

    if !(options.assemble || options.disassemble || options.readelf) {
        return Ok(());
    }

    cmd!(sh, "as --64 {LISTING_PATH} -o {OBJECT_PATH}").run().with_context(|| "failed assembling the listing")?;

    if options.disassemble || options.readelf {
        crate::create_path_if_not_exists(sh, DEBUG_DIR)?;
    }

    if options.disassemble {
        let output = cmd!(sh, "objdump -d {OBJECT_PATH}").output()?;
        sh.write_file(".debug/disassembly", output.stdout)?;
    }

    if options.readelf {
        let output = cmd!(sh, "readelf -s {OBJECT_PATH}").output()?;
        sh.write_file(".debug/readelf", output.stdout)?;
    }

    Ok(())
}
