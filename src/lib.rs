//! # sqlcraft
//!
//! A type-safe SQL query builder and lightweight ORM.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         Expr<T> - typed expression algebra               │
//! │  (zero-sized TypeClass markers make ill-typed SQL        │
//! │   unrepresentable: Expr<StringClass> has no .add())      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │      Query / Insert / Update / Delete - clause layer     │
//! │      (fixed clause emission order, dialect-agnostic)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [SqlDialect::finalize]
//! ┌─────────────────────────────────────────────────────────┐
//! │              (sql: String, params: Vec<Value>)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Driver - caller-supplied]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Rows  ──▶  QRM folding  ──▶  #[derive(FromRow)]    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate builds statements and maps result rows back into typed Rust
//! structs; it does not ship a driver. Connection management, pooling and
//! authentication are the caller's own adapter, implementing [`driver::Driver`].

pub mod config;
pub mod driver;
pub mod error;
pub mod qrm;
pub mod sql;
pub mod table;
pub mod types;
pub mod value;

pub use sql::dialect;
pub use sql::dml;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

pub use sqlcraft_derive::FromRow;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::ConnectOptions;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::driver::{CancellationToken, Driver};
    pub use crate::error::{Error, Result};
    pub use crate::expr::{
        avg, case, case_on, cast, coalesce, col, count, count_distinct, count_star, func,
        lit_bool, lit_float, lit_int, lit_str, max, min, null, star, sum, table_star,
        BinaryOperator, BoolClass, BytesClass, DateClass, Expr, ExprNode, FloatClass,
        IntegerClass, IntervalClass, NumericClass, RowClass, StringClass, TimeClass,
        TimestampClass, TimestampTzClass, TypeClass, UnaryOperator, Untyped, WindowExt,
    };
    pub use crate::qrm::{FromRow, FromSqlValue, Row, RowStream};
    pub use crate::query::{
        Cte, Join, JoinType, LimitOffset, LockMode, OrderByExpr, Query, SelectExpr, SetOpType,
        SetOperation, SortDir, TableRef,
    };
    pub use crate::sql::dml::{Delete, Insert, OnConflict, Update};
    pub use crate::table::TableDescriptor;
    pub use crate::token::{Token, TokenStream};
    pub use crate::value::Value;
    pub use sqlcraft_derive::FromRow;
}

pub use dialect::Dialect;
pub use error::{Error, Result};
pub use query::{OrderByExpr, Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};
pub use value::Value;
