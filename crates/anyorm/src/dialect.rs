//! SQL dialect selection.
//!
//! A [`Dialect`] is supplied per connection and drives two things: the
//! identifier escape pair used by the quoter, and the pagination rewrite
//! strategy applied by the compiler. All listed dialects can quote; only a
//! subset has a pagination rule (see `qb::compile`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{OrmError, OrmResult};

/// Supported SQL dialects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Sqlite,
    Postgres,
    SqlServer,
    Oracle,
    Db2,
    H2,
}

impl Dialect {
    /// The identifier escape pair for this dialect.
    ///
    /// MySQL uses backticks, SQL Server brackets, everything else the
    /// standard double quote.
    pub fn quote_pair(&self) -> (char, char) {
        match self {
            Dialect::MySql => ('`', '`'),
            Dialect::SqlServer => ('[', ']'),
            Dialect::Sqlite
            | Dialect::Postgres
            | Dialect::Oracle
            | Dialect::Db2
            | Dialect::H2 => ('"', '"'),
        }
    }

    /// Whether `word` is a SQL keyword that must be left unescaped when it
    /// appears in column position.
    pub fn is_keyword(&self, word: &str) -> bool {
        const KEYWORDS: &[&str] = &[
            "NULL",
            "TRUE",
            "FALSE",
            "DEFAULT",
            "CURRENT_TIMESTAMP",
            "CURRENT_DATE",
            "CURRENT_TIME",
        ];
        KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
            Dialect::Db2 => "db2",
            Dialect::H2 => "h2",
        };
        f.write_str(name)
    }
}

impl FromStr for Dialect {
    type Err = OrmError;

    fn from_str(s: &str) -> OrmResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "oracle" => Ok(Dialect::Oracle),
            "db2" => Ok(Dialect::Db2),
            "h2" => Ok(Dialect::H2),
            other => Err(OrmError::UnknownDialect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_pairs() {
        assert_eq!(Dialect::MySql.quote_pair(), ('`', '`'));
        assert_eq!(Dialect::SqlServer.quote_pair(), ('[', ']'));
        assert_eq!(Dialect::Postgres.quote_pair(), ('"', '"'));
        assert_eq!(Dialect::Oracle.quote_pair(), ('"', '"'));
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert!("sybase".parse::<Dialect>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let s = serde_json::to_string(&Dialect::SqlServer).unwrap();
        assert_eq!(s, "\"sqlserver\"");
        let d: Dialect = serde_json::from_str(&s).unwrap();
        assert_eq!(d, Dialect::SqlServer);
    }

    #[test]
    fn keywords_unquoted() {
        assert!(Dialect::MySql.is_keyword("null"));
        assert!(Dialect::Postgres.is_keyword("CURRENT_TIMESTAMP"));
        assert!(!Dialect::MySql.is_keyword("username"));
    }
}
