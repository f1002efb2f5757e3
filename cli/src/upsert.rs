#![deny(missing_docs)]

//! # Upsert Command
//!
//! Applies a document of desired type definitions to the schema package.
//!
//! The document is JSON or YAML (chosen by extension) holding either one
//! `{ name, fields, edges }` entry or a list of them. Entries are applied in
//! order and the run stops at the first failure.

use crate::error::{CliError, CliResult};
use crate::session::SessionArgs;
use schemapatch_core::{mutate, Mutator, UpsertSchema};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments for the upsert command.
#[derive(clap::Args, Debug, Clone)]
pub struct UpsertArgs {
    /// Path to the JSON or YAML document.
    #[clap(long, short)]
    pub input: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Documents {
    Many(Vec<UpsertSchema>),
    One(UpsertSchema),
}

/// Reads the upsert entries from `path`.
pub fn load_documents(path: &Path) -> CliResult<Vec<UpsertSchema>> {
    let content = fs::read_to_string(path)?;
    let docs: Documents = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        other => {
            return Err(CliError::General(format!(
                "unsupported input format {:?}, expected .json, .yaml or .yml",
                other.unwrap_or("")
            )))
        }
    };
    Ok(match docs {
        Documents::Many(list) => list,
        Documents::One(doc) => vec![doc],
    })
}

/// Executes the upsert.
pub fn execute(args: &UpsertArgs, session: &SessionArgs, out: &mut impl Write) -> CliResult<()> {
    let docs = load_documents(&args.input)?;
    let mut ctx = session.open()?;

    let mutators: Vec<&dyn Mutator> = docs.iter().map(|d| d as &dyn Mutator).collect();
    mutate(&mut ctx, &mutators)?;

    session.finish(&mut ctx, out)
}
