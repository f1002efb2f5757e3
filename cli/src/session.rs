#![deny(missing_docs)]

//! # Session Options
//!
//! Where the schema package lives and what to do with the edited files.

use crate::error::CliResult;
use schemapatch_core::Context;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Options shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// Directory holding the schema files.
    #[clap(long, short, global = true, env = "SCHEMAPATCH_DIR", default_value = "./schema")]
    pub dir: PathBuf,

    /// Print edited files to stdout instead of writing them.
    #[clap(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[clap(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SessionArgs {
    /// Default log directive for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Loads the schema package.
    pub fn open(&self) -> CliResult<Context> {
        Ok(Context::load(&self.dir)?)
    }

    /// Writes the edited files back, or prints the whole package on `--dry-run`.
    pub fn finish(&self, ctx: &mut Context, out: &mut impl Write) -> CliResult<()> {
        if !ctx.is_dirty() {
            writeln!(out, "No changes.")?;
            return Ok(());
        }

        if self.dry_run {
            for (path, text) in ctx.render() {
                writeln!(out, "// {}", path.display())?;
                write!(out, "{}", text)?;
            }
            return Ok(());
        }

        let written = ctx.save()?;
        info!(written, "wrote schema files");
        writeln!(out, "Updated {} file(s) in {:?}", written, self.dir)?;
        Ok(())
    }
}
