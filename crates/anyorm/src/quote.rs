//! Identifier quoting.
//!
//! Wraps table and column names in the dialect's escape pair. Qualified
//! `table.column` paths are split and each component is quoted on its own;
//! `*`, recognized keywords, and anything that is not a plain identifier
//! path (function calls, arithmetic, already-quoted text) pass through
//! verbatim.

use crate::dialect::Dialect;

/// Per-dialect identifier quoter.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Quoter {
    dialect: Dialect,
}

impl Quoter {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Wrap a single identifier segment in the dialect's escape pair,
    /// doubling any embedded closing character.
    pub(crate) fn quote_identifier(&self, id: &str) -> String {
        let (open, close) = self.dialect.quote_pair();
        let mut out = String::with_capacity(id.len() + 2);
        out.push(open);
        for ch in id.chars() {
            out.push(ch);
            if ch == close {
                out.push(close);
            }
        }
        out.push(close);
        out
    }

    /// Quote a column reference.
    ///
    /// Handles qualified `table.column` paths; leaves `*` and keywords bare;
    /// passes non-identifier expressions through untouched.
    pub(crate) fn quote_column(&self, column: &str) -> String {
        if !is_identifier_path(column) {
            return column.to_string();
        }

        let mut out = String::with_capacity(column.len() + 4);
        let last = column.split('.').count() - 1;
        for (i, part) in column.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            if i == last && (part == "*" || self.dialect.is_keyword(part)) {
                out.push_str(part);
            } else {
                out.push_str(&self.quote_identifier(part));
            }
        }
        out
    }

    /// Quote a column with an optional alias: `col AS "alias"`.
    pub(crate) fn quote_column_alias(&self, column: &str, alias: Option<&str>) -> String {
        match alias {
            Some(a) => format!("{} AS {}", self.quote_column(column), self.quote_identifier(a)),
            None => self.quote_column(column),
        }
    }

    /// Quote a table name with an optional alias.
    ///
    /// No `AS` between table and alias; Oracle rejects it.
    pub(crate) fn quote_table(&self, table: &str, alias: Option<&str>) -> String {
        let quoted = if is_identifier_path(table) {
            let mut out = String::with_capacity(table.len() + 4);
            for (i, part) in table.split('.').enumerate() {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&self.quote_identifier(part));
            }
            out
        } else {
            table.to_string()
        };
        match alias {
            Some(a) => format!("{} {}", quoted, self.quote_identifier(a)),
            None => quoted,
        }
    }
}

/// Whether `s` is a plain (possibly dotted, possibly `*`-suffixed)
/// identifier path that quoting applies to.
fn is_identifier_path(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '.' || c == '*' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_column() {
        let q = Quoter::new(Dialect::MySql);
        assert_eq!(q.quote_column("name"), "`name`");
    }

    #[test]
    fn qualified_column() {
        let q = Quoter::new(Dialect::MySql);
        assert_eq!(q.quote_column("user.id"), "`user`.`id`");
        assert_eq!(q.quote_column("user.*"), "`user`.*");
    }

    #[test]
    fn star_and_keywords_pass_through() {
        let q = Quoter::new(Dialect::Postgres);
        assert_eq!(q.quote_column("*"), "*");
        assert_eq!(q.quote_column("NULL"), "NULL");
    }

    #[test]
    fn expressions_pass_through() {
        let q = Quoter::new(Dialect::MySql);
        assert_eq!(q.quote_column("count(1)"), "count(1)");
        assert_eq!(q.quote_column("a + b"), "a + b");
    }

    #[test]
    fn dialect_escape_pairs() {
        assert_eq!(Quoter::new(Dialect::Postgres).quote_column("id"), "\"id\"");
        assert_eq!(Quoter::new(Dialect::SqlServer).quote_column("id"), "[id]");
        assert_eq!(Quoter::new(Dialect::Oracle).quote_column("id"), "\"id\"");
    }

    #[test]
    fn embedded_quote_doubled() {
        let q = Quoter::new(Dialect::MySql);
        assert_eq!(q.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn table_alias_without_as() {
        let q = Quoter::new(Dialect::Oracle);
        assert_eq!(q.quote_table("user", Some("u")), "\"user\" \"u\"");
    }

    #[test]
    fn column_alias_with_as() {
        let q = Quoter::new(Dialect::MySql);
        assert_eq!(
            q.quote_column_alias("count(1)", Some("num")),
            "count(1) AS `num`"
        );
    }
}
