//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder, CTEs, set operations
//! - [`expr`] - Typed expression algebra and builder DSL
//! - [`dml`] - Data Manipulation Language (INSERT, UPDATE, DELETE)
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod dml;
pub mod expr;
pub mod query;
pub mod token;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, case, case_on, cast, col, coalesce, count, count_distinct, count_star, cume_dist,
    dense_rank, first_value, func, lag, lag_default, lag_offset, last_value, lead, lead_offset,
    lit_bool, lit_float, lit_int, lit_str, max, min, nth_value, null, ntile, order_asc,
    order_desc, percent_rank, rank, raw_sql, row_number, star, sum, table_star, BinaryOperator,
    BoolClass, BytesClass, DateClass, Expr, ExprNode, FloatClass, IntegerClass, IntervalClass,
    NullsOrder, NumericClass, RowClass, SortDir, StringClass, TimeClass, TimestampClass,
    TimestampTzClass, TypeClass, UnaryOperator, Untyped, WindowExt, WindowFrame, WindowOrderBy,
};
pub use dml::{Delete, Insert, OnConflict, Update};
pub use query::{
    qrm_projection, Cte, Join, JoinType, LimitOffset, LockMode, OrderByExpr, Query, SelectExpr,
    SetOpType, SetOperation, TableRef,
};
pub use token::{Token, TokenStream};
