#![deny(missing_docs)]

//! # Single Edit Commands
//!
//! Add a type, remove one field or edge, or list the registered types.

use crate::error::CliResult;
use crate::session::SessionArgs;
use std::io::Write;

/// Arguments naming one entry of a type.
#[derive(clap::Args, Debug, Clone)]
pub struct EntryArgs {
    /// The schema type.
    #[clap(long)]
    pub type_name: String,

    /// The field or edge name.
    #[clap(long)]
    pub name: String,
}

/// Prints the registered type names, one per line.
pub fn list(session: &SessionArgs, out: &mut impl Write) -> CliResult<()> {
    let ctx = session.open()?;
    for name in ctx.type_names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Declares a new, empty type.
pub fn add_type(name: &str, session: &SessionArgs, out: &mut impl Write) -> CliResult<()> {
    let mut ctx = session.open()?;
    ctx.add_type(name)?;
    session.finish(&mut ctx, out)
}

/// Removes one field.
pub fn remove_field(args: &EntryArgs, session: &SessionArgs, out: &mut impl Write) -> CliResult<()> {
    let mut ctx = session.open()?;
    ctx.remove_field(&args.type_name, &args.name)?;
    session.finish(&mut ctx, out)
}

/// Removes one edge.
pub fn remove_edge(args: &EntryArgs, session: &SessionArgs, out: &mut impl Write) -> CliResult<()> {
    let mut ctx = session.open()?;
    ctx.remove_edge(&args.type_name, &args.name)?;
    session.finish(&mut ctx, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const USER: &str = "pub struct User;\n\nimpl Schema for User {\n    fn fields() -> Vec<Field> {\n        vec![field::string(\"a\"), field::string(\"b\")]\n    }\n}\n";

    #[test]
    fn test_remove_field_writes_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("user.rs"), USER).unwrap();
        let session = SessionArgs {
            dir: dir.path().to_path_buf(),
            dry_run: false,
            verbose: 0,
        };
        let args = EntryArgs {
            type_name: "User".into(),
            name: "a".into(),
        };

        let mut out = Vec::new();
        remove_field(&args, &session, &mut out).unwrap();
        let written = fs::read_to_string(dir.path().join("user.rs")).unwrap();
        assert!(written.contains(r#"vec![field::string("b")]"#));

        let err = remove_field(&args, &session, &mut out).unwrap_err();
        assert_eq!(err.to_string(), r#"could not find field "a" in type "User""#);
    }

    #[test]
    fn test_list_types() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("user.rs"), USER).unwrap();
        fs::write(dir.path().join("z.rs"), "struct Zed;").unwrap();
        let session = SessionArgs {
            dir: dir.path().to_path_buf(),
            dry_run: false,
            verbose: 0,
        };
        let mut out = Vec::new();
        list(&session, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "User\nZed\n");
    }
}
