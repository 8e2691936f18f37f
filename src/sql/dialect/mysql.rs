//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - `||` is logical OR by default (use CONCAT())
//! - bare `?` placeholders, unindexed
//! - ON DUPLICATE KEY UPDATE for upserts (modeled through `ON CONFLICT` at
//!   the statement layer, rendered as `ON DUPLICATE KEY UPDATE`)
//! - No RETURNING clause
//! - No NULLS FIRST/LAST

use super::helpers;
use super::SqlDialect;
use crate::types::SqlDataType;

#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn concat_operator(&self) -> &'static str {
        "||"
    }

    fn supports_concat_operator(&self) -> bool {
        // MySQL's `||` is logical OR unless PIPES_AS_CONCAT is set; callers
        // get CONCAT(a, b) instead (see Expr::concat rendering).
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_on_conflict(&self) -> bool {
        true
    }

    fn regex_operator(&self) -> &'static str {
        "REGEXP"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }

    fn emit_data_type(&self, dt: &SqlDataType) -> String {
        helpers::emit_data_type_mysql(dt)
    }
}
