//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - `$N` placeholders
//! - RETURNING clause
//! - ON CONFLICT for upserts
//! - DISTINCT ON
//! - ILIKE
//! - FILTER clause for aggregates

use super::helpers;
use super::SqlDialect;
use crate::types::SqlDataType;

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    // Uses default `$N` placeholder and default LIMIT/OFFSET.

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn supports_aggregate_filter(&self) -> bool {
        true
    }

    fn supports_groups_frame(&self) -> bool {
        true
    }

    fn supports_on_conflict(&self) -> bool {
        true
    }

    fn bitwise_xor_operator(&self) -> &'static str {
        "#"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_postgres(name)
    }

    fn emit_data_type(&self, dt: &SqlDataType) -> String {
        helpers::emit_data_type_postgres(dt)
    }
}
