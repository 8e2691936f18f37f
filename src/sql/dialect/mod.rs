//! SQL dialects.
//!
//! Dialect differences are a strategy-object concern, not subclassing: a
//! `Dialect` value holds a set of overridable pure functions rather than
//! a family of statement subclasses. Two families are in scope:
//! PostgreSQL and MySQL.

mod helpers;
mod mysql;
mod postgres;

pub use mysql::MySql;
pub use postgres::Postgres;

use crate::sql::token::TokenStream;
use crate::types::SqlDataType;
use std::fmt;

/// Behavior that diverges between PostgreSQL-family and MySQL-family
/// dialects. Every method has an ANSI-ish default so a concrete dialect
/// only overrides what actually differs.
pub trait SqlDialect: fmt::Debug {
    fn name(&self) -> &'static str;

    fn quote_identifier(&self, ident: &str) -> String;

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    fn format_bool(&self, b: bool) -> &'static str;

    fn format_null(&self) -> &'static str {
        "NULL"
    }

    /// Render the N-th (1-based) placeholder for a parameterized query.
    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// `||` for PostgreSQL-family, not supported (use `CONCAT`) in
    /// MySQL-family.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    fn supports_concat_operator(&self) -> bool {
        true
    }

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_distinct_on(&self) -> bool {
        false
    }

    fn supports_ilike(&self) -> bool {
        false
    }

    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    fn supports_groups_frame(&self) -> bool {
        false
    }

    fn supports_on_conflict(&self) -> bool {
        false
    }

    /// Bitwise XOR operator spelling: `#` for PostgreSQL, `^` for MySQL.
    fn bitwise_xor_operator(&self) -> &'static str {
        "^"
    }

    /// Regex-match operator spelling: `~` for PostgreSQL, `REGEXP` for MySQL.
    fn regex_operator(&self) -> &'static str {
        "~"
    }

    /// Case-insensitive remap of a function name to the dialect's spelling.
    fn remap_function(&self, _name: &str) -> Option<&'static str> {
        None
    }

    fn emit_data_type(&self, dt: &SqlDataType) -> String {
        dt.emit_postgres()
    }
}

/// The dialect a statement is rendered for. A plain value, never global
/// state: every rendering call takes one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.dialect().supports_nulls_ordering()
    }

    fn supports_returning(&self) -> bool {
        self.dialect().supports_returning()
    }

    fn supports_distinct_on(&self) -> bool {
        self.dialect().supports_distinct_on()
    }

    fn supports_ilike(&self) -> bool {
        self.dialect().supports_ilike()
    }

    fn supports_aggregate_filter(&self) -> bool {
        self.dialect().supports_aggregate_filter()
    }

    fn supports_groups_frame(&self) -> bool {
        self.dialect().supports_groups_frame()
    }

    fn supports_on_conflict(&self) -> bool {
        self.dialect().supports_on_conflict()
    }

    fn bitwise_xor_operator(&self) -> &'static str {
        self.dialect().bitwise_xor_operator()
    }

    fn regex_operator(&self) -> &'static str {
        self.dialect().regex_operator()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }

    fn emit_data_type(&self, dt: &SqlDataType) -> String {
        self.dialect().emit_data_type(dt)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Postgres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_quotes_with_double_quotes() {
        assert_eq!(Dialect::Postgres.quote_identifier("Album"), "\"Album\"");
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        assert_eq!(Dialect::MySql.quote_identifier("Album"), "`Album`");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        assert_eq!(Dialect::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::MySql.quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn postgres_bool_is_literal_mysql_is_numeric() {
        assert_eq!(Dialect::Postgres.format_bool(true), "true");
        assert_eq!(Dialect::MySql.format_bool(true), "1");
    }

    #[test]
    fn mysql_has_no_concat_operator() {
        assert!(!Dialect::MySql.supports_concat_operator());
        assert!(Dialect::Postgres.supports_concat_operator());
    }

    #[test]
    fn placeholder_styles_diverge() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
    }

    #[test]
    fn display_uses_dialect_name() {
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::MySql.to_string(), "mysql");
    }
}
