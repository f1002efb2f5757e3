//! # Dialects
//!
//! Storage backends whose column types can be overridden per field.

use std::fmt::Display;
use std::str::FromStr;

/// A storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL and MariaDB.
    MySql,
    /// SQLite 3.
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// Gremlin graph databases.
    Gremlin,
}

impl Dialect {
    /// All known dialects.
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::Postgres,
        Dialect::Gremlin,
    ];

    /// The canonical wire name used as a schema-type key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite3",
            Dialect::Postgres => "postgres",
            Dialect::Gremlin => "gremlin",
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "gremlin" => Ok(Dialect::Gremlin),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

impl AsRef<str> for Dialect {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a schema-type key to its canonical dialect name.
///
/// Keys that name no known dialect are returned unchanged.
pub fn canonical_name(key: &str) -> String {
    key.parse::<Dialect>()
        .map(|d| d.as_str().to_string())
        .unwrap_or_else(|_| key.to_string())
}
