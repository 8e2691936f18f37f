//! DML statements - INSERT, UPDATE, DELETE (§4.4).
//!
//! Mirrors `query.rs`'s shape: each statement stores its pieces as untyped
//! [`ExprNode`]s (a row is necessarily heterogeneous in column type), is
//! built up by consuming `self` builder methods, and renders into a
//! [`TokenStream`] in a fixed clause order regardless of call order. A
//! missing `WHERE` on UPDATE/DELETE is deliberately not an error (§7) - it
//! is valid SQL, just one the caller should think twice about.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{Expr, ExprNode, TypeClass};
use super::query::{Query, SelectExpr};
use super::token::{Token, TokenStream};
use crate::value::Value;

fn table_tokens(schema: &Option<String>, table: &str) -> Token {
    Token::QualifiedIdent {
        schema: schema.clone(),
        name: table.to_string(),
    }
}

fn returning_tokens(returning: &[SelectExpr], dialect: Dialect, ts: &mut TokenStream) {
    if returning.is_empty() || !dialect.supports_returning() {
        return;
    }
    ts.space().push(Token::Returning).space();
    for (i, item) in returning.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&item.to_tokens_for_dialect(dialect));
    }
}

// ============================================================================
// INSERT
// ============================================================================

/// `INSERT INTO table(cols) VALUES (row), (row), ...` or
/// `INSERT INTO table(cols) <sub-select>`, with optional `ON CONFLICT` and
/// `RETURNING`.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql() or finalize()"]
pub struct Insert {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ExprNode>>,
    pub from_query: Option<Box<Query>>,
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<SelectExpr>,
}

impl Insert {
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn columns(mut self, cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one VALUES row. Each element's static type class is erased
    /// here (a row spans many columns of differing classes); call
    /// [`Expr::into_node`] or pass a literal constructor directly.
    pub fn values(mut self, row: Vec<ExprNode>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn values_many(mut self, rows: impl IntoIterator<Item = Vec<ExprNode>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn from_select(mut self, query: Query) -> Self {
        self.from_query = Some(Box::new(query));
        self
    }

    pub fn on_conflict(mut self, conflict: OnConflict) -> Self {
        self.on_conflict = Some(conflict);
        self
    }

    pub fn returning(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.returning = exprs.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Insert).space().push(Token::Into).space();
        ts.push(table_tokens(&self.schema, &self.table));

        if !self.columns.is_empty() {
            ts.lparen();
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(col.clone()));
            }
            ts.rparen();
        }

        ts.space();
        if let Some(query) = &self.from_query {
            ts.append(&query.to_tokens_for_dialect(dialect));
        } else {
            ts.push(Token::Values).space();
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.lparen();
                for (j, expr) in row.iter().enumerate() {
                    if j > 0 {
                        ts.comma().space();
                    }
                    ts.append(&expr.to_tokens(dialect));
                }
                ts.rparen();
            }
        }

        if let Some(conflict) = &self.on_conflict {
            if dialect.supports_on_conflict() {
                ts.space();
                ts.append(&conflict.to_tokens(dialect));
            }
        }

        returning_tokens(&self.returning, dialect, &mut ts);
        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).to_sql(dialect)
    }

    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<Value>) {
        self.to_tokens(dialect).finalize(dialect, debug, pretty)
    }
}

/// `ON CONFLICT` clause for INSERT, gated by `dialect.supports_on_conflict()`.
#[derive(Debug, Clone)]
pub enum OnConflict {
    DoNothing,
    DoUpdate {
        conflict_columns: Vec<String>,
        set: Vec<(String, ExprNode)>,
    },
}

impl OnConflict {
    pub fn do_nothing() -> Self {
        OnConflict::DoNothing
    }

    pub fn do_update(
        conflict_columns: impl IntoIterator<Item = impl Into<String>>,
        set: Vec<(impl Into<String>, ExprNode)>,
    ) -> Self {
        OnConflict::DoUpdate {
            conflict_columns: conflict_columns.into_iter().map(Into::into).collect(),
            set: set.into_iter().map(|(c, e)| (c.into(), e)).collect(),
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            OnConflict::DoNothing => {
                ts.push(Token::On)
                    .space()
                    .push(Token::Conflict)
                    .space()
                    .push(Token::Do)
                    .space()
                    .push(Token::Nothing);
            }
            OnConflict::DoUpdate { conflict_columns, set } => {
                ts.push(Token::On).space().push(Token::Conflict).space().lparen();
                for (i, col) in conflict_columns.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.push(Token::Ident(col.clone()));
                }
                ts.rparen()
                    .space()
                    .push(Token::Do)
                    .space()
                    .push(Token::Update)
                    .space()
                    .push(Token::Set)
                    .space();
                for (i, (col, expr)) in set.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.push(Token::Ident(col.clone()))
                        .space()
                        .push(Token::Eq)
                        .space()
                        .append(&expr.to_tokens(dialect));
                }
            }
        }
        ts
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// `UPDATE table SET col = expr, ... [FROM ...] WHERE ... [RETURNING ...]`.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql() or finalize()"]
pub struct Update {
    pub schema: Option<String>,
    pub table: String,
    pub assignments: Vec<(String, ExprNode)>,
    pub from: Option<String>,
    pub where_clause: Option<ExprNode>,
    pub returning: Vec<SelectExpr>,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn set<T: TypeClass>(mut self, column: impl Into<String>, value: Expr<T>) -> Self {
        self.assignments.push((column.into(), value.into_node()));
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// ANDs onto any existing WHERE condition, like `Query::filter`.
    pub fn filter(mut self, condition: Expr<super::expr::BoolClass>) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => ExprNode::BinaryOp {
                left: Box::new(existing),
                op: super::expr::BinaryOperator::And,
                right: Box::new(condition.into_node()),
            },
            None => condition.into_node(),
        });
        self
    }

    pub fn returning(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.returning = exprs.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Update).space();
        ts.push(table_tokens(&self.schema, &self.table));
        ts.space().push(Token::Set).space();

        for (i, (col, expr)) in self.assignments.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Ident(col.clone()))
                .space()
                .push(Token::Eq)
                .space()
                .append(&expr.to_tokens(dialect));
        }

        if let Some(from) = &self.from {
            ts.space().push(Token::From).space().push(Token::Ident(from.clone()));
        }

        if let Some(where_clause) = &self.where_clause {
            ts.space().push(Token::Where).space();
            ts.append(&where_clause.to_tokens(dialect));
        }

        returning_tokens(&self.returning, dialect, &mut ts);
        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).to_sql(dialect)
    }

    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<Value>) {
        self.to_tokens(dialect).finalize(dialect, debug, pretty)
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// `DELETE FROM table [USING ...] [WHERE ...] [RETURNING ...]`.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql() or finalize()"]
pub struct Delete {
    pub schema: Option<String>,
    pub table: String,
    pub using: Vec<String>,
    pub where_clause: Option<ExprNode>,
    pub returning: Vec<SelectExpr>,
}

impl Delete {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn using(mut self, tables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.using = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, condition: Expr<super::expr::BoolClass>) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => ExprNode::BinaryOp {
                left: Box::new(existing),
                op: super::expr::BinaryOperator::And,
                right: Box::new(condition.into_node()),
            },
            None => condition.into_node(),
        });
        self
    }

    pub fn returning(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.returning = exprs.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Delete).space().push(Token::From).space();
        ts.push(table_tokens(&self.schema, &self.table));

        if !self.using.is_empty() {
            ts.space().push(Token::Using).space();
            for (i, table) in self.using.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(table.clone()));
            }
        }

        if let Some(where_clause) = &self.where_clause {
            ts.space().push(Token::Where).space();
            ts.append(&where_clause.to_tokens(dialect));
        }

        returning_tokens(&self.returning, dialect, &mut ts);
        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).to_sql(dialect)
    }

    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<Value>) {
        self.to_tokens(dialect).finalize(dialect, debug, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{col, lit_int, lit_str, IntegerClass, StringClass};

    #[test]
    fn insert_renders_values_row() {
        let insert = Insert::into("users")
            .columns(["name", "email"])
            .values(vec![lit_str("Alice").into_node(), lit_str("alice@example.com").into_node()]);

        let (sql, args) = insert.finalize(Dialect::Postgres, false, false);
        assert_eq!(
            sql,
            "INSERT INTO \"users\"(\"name\", \"email\") VALUES ($1, $2)"
        );
        assert_eq!(
            args,
            vec![
                Value::String("Alice".to_string()),
                Value::String("alice@example.com".to_string())
            ]
        );
    }

    #[test]
    fn insert_on_conflict_do_nothing_gated_by_dialect() {
        let insert = Insert::into("users")
            .columns(["id"])
            .values(vec![lit_int(1).into_node()])
            .on_conflict(OnConflict::do_nothing());

        assert!(insert.to_sql(Dialect::Postgres).contains("ON CONFLICT DO NOTHING"));
    }

    #[test]
    fn insert_returning_gated_by_dialect_support() {
        let insert = Insert::into("users")
            .columns(["id"])
            .values(vec![lit_int(1).into_node()])
            .returning(vec![col::<IntegerClass>("users", "id")]);

        assert!(insert.to_sql(Dialect::Postgres).contains("RETURNING"));
        assert!(!insert.to_sql(Dialect::MySql).contains("RETURNING"));
    }

    #[test]
    fn update_sets_multiple_columns_and_filters() {
        let update = Update::table("users")
            .set("status", lit_str("active"))
            .filter(col::<IntegerClass>("users", "id").eq(lit_int(1)));

        let (sql, args) = update.finalize(Dialect::Postgres, false, false);
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"status\" = $1 WHERE (\"users\".\"id\" = $2)"
        );
        assert_eq!(args, vec![Value::String("active".to_string()), Value::Int(1)]);
    }

    #[test]
    fn update_without_where_is_valid_not_an_error() {
        let update = Update::table("users").set("status", lit_str("active"));
        let (sql, args) = update.finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "UPDATE \"users\" SET \"status\" = $1");
        assert_eq!(args, vec![Value::String("active".to_string())]);
    }

    #[test]
    fn delete_with_filter_and_returning() {
        let delete = Delete::from("users")
            .filter(col::<StringClass>("users", "status").eq(lit_str("inactive")))
            .returning(vec![col::<IntegerClass>("users", "id")]);

        let sql = delete.to_sql(Dialect::Postgres);
        assert!(sql.starts_with("DELETE FROM \"users\" WHERE"));
        assert!(sql.contains("RETURNING"));
    }
}
