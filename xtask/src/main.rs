mod generate;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use xshell::{cmd, Shell};

#[derive(Parser)]
struct Fmt {
    args: Vec<String>,
}

#[derive(Parser)]
#[command(rename_all = "snake_case")]
enum Arguments {
    Clean,
    Check,
    Clippy,
    Test,
    Fmt(Fmt),

    Generate(generate::Options),
}

fn main() -> Result<()> {
    let sh = Shell::new()?;

    match Arguments::parse() {
        Arguments::Clean => {
            cmd!(sh, "cargo clean").run().with_context(|| "`cargo clean` failed")?;
            if sh.path_exists(generate::OUTPUT_DIR) {
                sh.remove_path(generate::OUTPUT_DIR)?;
            }
        }

        Arguments::Check => {
            cmd!(sh, "cargo check --workspace --all-targets").run().with_context(|| "`cargo check` failed")?;
        }

        Arguments::Clippy => {
            cmd!(sh, "cargo clippy --workspace --all-targets").run().with_context(|| "`cargo clippy` failed")?;
        }

        Arguments::Test => {
            cmd!(sh, "cargo test --workspace").run().with_context(|| "`cargo test` failed")?;
        }

        Arguments::Fmt(fmt) => {
            let args = &fmt.args;
            cmd!(sh, "cargo fmt {args...}").run().with_context(|| "`cargo fmt` failed")?;
        }

        Arguments::Generate(options) => {
            generate::generate(&sh, options)?;
        }
    }

    Ok(())
}

fn create_path_if_not_exists<P: AsRef<Path>>(sh: &Shell, path: P) -> Result<()> {
    if !sh.path_exists(path.as_ref()) {
        sh.create_dir(path.as_ref())?;
    }

    Ok(())
}
