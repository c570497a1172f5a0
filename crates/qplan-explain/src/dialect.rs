//! Supported EXPLAIN dialects

use crate::error::ExplainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database engine whose EXPLAIN output is being normalized
///
/// Serializes lowercase; deserializes through [`FromStr`], so settings files
/// accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dialect {
    Postgresql,
    Mysql,
    Mariadb,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Postgresql, Dialect::Mysql, Dialect::Mariadb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Mariadb => "mariadb",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            "mysql" => Ok(Self::Mysql),
            "mariadb" => Ok(Self::Mariadb),
            _ => Err(ExplainError::UnrecognizedDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = ExplainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}
