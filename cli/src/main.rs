#![deny(missing_docs)]

//! # Schemapatch CLI
//!
//! Command Line Interface for editing schema packages in place.
//!
//! Supported Commands:
//! - `list`: Prints the declared schema types.
//! - `add-type`: Declares an empty type.
//! - `upsert`: Rewrites types from a JSON/YAML document.
//! - `remove-field` / `remove-edge`: Drops one entry from a type.

use clap::{Parser, Subcommand};
use std::io;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;
use crate::session::SessionArgs;

mod edit;
mod error;
mod session;
mod upsert;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Schema file editor")]
struct Cli {
    #[clap(flatten)]
    session: SessionArgs,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the declared schema types.
    List,
    /// Declare a new type with empty fields and edges.
    AddType {
        /// Name of the type.
        #[clap(long)]
        name: String,
    },
    /// Rewrite types to match a JSON or YAML document.
    Upsert(upsert::UpsertArgs),
    /// Remove a field from a type.
    RemoveField(edit::EntryArgs),
    /// Remove an edge from a type.
    RemoveEdge(edit::EntryArgs),
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.session.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    let session = &cli.session;
    let mut out = io::stdout().lock();

    match &cli.command {
        Commands::List => edit::list(session, &mut out)?,
        Commands::AddType { name } => edit::add_type(name, session, &mut out)?,
        Commands::Upsert(args) => upsert::execute(args, session, &mut out)?,
        Commands::RemoveField(args) => edit::remove_field(args, session, &mut out)?,
        Commands::RemoveEdge(args) => edit::remove_edge(args, session, &mut out)?,
    }

    Ok(())
}
