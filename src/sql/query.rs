//! Statement layer - SELECT assembly, CTEs, set operations.
//!
//! `Query::to_tokens_for_dialect` renders clauses in a fixed order
//! (WITH, SELECT, FROM, JOIN, WHERE, GROUP BY, HAVING, ORDER BY,
//! LIMIT/OFFSET) regardless of the order methods were called in; only the
//! renderer decides clause order, never the builder call sequence.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{self, BoolClass, Expr, ExprNode, NullsOrder, SortDir, TypeClass};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (projection item with optional alias)
// =============================================================================

/// A SELECT list item: an expression with an optional alias. Stored
/// untyped, since a projection list is necessarily heterogeneous in type
/// class.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: ExprNode,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: ExprNode) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl<T: TypeClass> From<Expr<T>> for SelectExpr {
    fn from(expr: Expr<T>) -> Self {
        SelectExpr::new(expr.into_node())
    }
}

/// The `"<Table>.<Column>"` alias QRM keys a destination field on. Wrap a
/// column reference in this to make it mappable by
/// [`crate::qrm::FromRow`].
pub fn qrm_projection<T: TypeClass>(table: &str, column: &str, expr: Expr<T>) -> SelectExpr {
    SelectExpr::new(expr.into_node()).with_alias(format!("{table}.{column}"))
}

// =============================================================================
// Table Reference
// =============================================================================

/// A table reference with optional schema and alias, or a derived table
/// (a sub-select used as a table source, always parenthesized and
/// always aliased per §4.4).
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
    derived: Option<Box<Query>>,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
            derived: None,
        }
    }

    /// A sub-select used as a table source: always rendered parenthesized
    /// and aliased (`(SELECT ...) AS alias`).
    pub fn derived(query: Query, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            schema: None,
            table: alias.clone(),
            alias: Some(alias),
            derived: Some(Box::new(query)),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name later clauses should qualify columns with: the alias if
    /// set, otherwise the bare table name.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::Postgres)
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        if let Some(query) = &self.derived {
            ts.lparen().append(&query.to_tokens_for_dialect(dialect)).rparen();
        } else {
            ts.push(Token::QualifiedIdent {
                schema: self.schema.clone(),
                name: self.table.clone(),
            });
        }
        if let Some(alias) = &self.alias {
            ts.space().push(Token::As).space().push(Token::Ident(alias.clone()));
        }
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Option<ExprNode>,
}

impl Join {
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
            JoinType::Right => ts.push(Token::Right),
            JoinType::Full => ts.push(Token::Full).space().push(Token::Outer),
            JoinType::Cross => ts.push(Token::Cross),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens_for_dialect(dialect));

        if let Some(on) = &self.on {
            ts.space().push(Token::On).space();
            ts.append(&on.to_tokens(dialect));
        }

        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: ExprNode,
    pub dir: Option<SortDir>,
    pub nulls: Option<NullsOrder>,
}

impl OrderByExpr {
    pub fn asc<T: TypeClass>(expr: Expr<T>) -> Self {
        Self {
            expr: expr.into_node(),
            dir: Some(SortDir::Asc),
            nulls: None,
        }
    }

    pub fn desc<T: TypeClass>(expr: Expr<T>) -> Self {
        Self {
            expr: expr.into_node(),
            dir: Some(SortDir::Desc),
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);

        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }

        if let Some(nulls) = &self.nulls {
            if dialect.supports_nulls_ordering() {
                ts.space().push(Token::Nulls).space();
                ts.push(match nulls {
                    NullsOrder::First => Token::First,
                    NullsOrder::Last => Token::Last,
                });
            }
            // MySQL has no NULLS FIRST/LAST; callers wanting that ordering
            // there should express it via a CASE-based sort key instead.
        }

        ts
    }
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// Set Operations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpType {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct SetOperation {
    pub left: Box<Query>,
    pub op: SetOpType,
    pub all: bool,
    pub right: Box<Query>,
}

impl SetOperation {
    fn new(left: Query, op: SetOpType, all: bool, right: Query) -> Self {
        Self {
            left: Box::new(left),
            op,
            all,
            right: Box::new(right),
        }
    }

    /// Chain another set operation onto this one, e.g. `a.union(b).chain(SetOpType::Except, false, c)`.
    pub fn chain(self, op: SetOpType, all: bool, right: Query) -> Self {
        let left_query = Query {
            set_op: Some(Box::new(self)),
            ..Default::default()
        };
        Self::new(left_query, op, all, right)
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        if self.left.set_op.is_some() {
            ts.append(&self.left.to_tokens_for_dialect(dialect));
        } else {
            ts.lparen().append(&self.left.to_tokens_for_dialect(dialect)).rparen();
        }

        ts.newline();
        ts.push(match self.op {
            SetOpType::Union => Token::Union,
            SetOpType::Intersect => Token::Intersect,
            SetOpType::Except => Token::Except,
        });
        if self.all {
            ts.space().push(Token::All);
        }
        ts.newline();

        ts.lparen().append(&self.right.to_tokens_for_dialect(dialect)).rparen();
        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).to_sql(dialect)
    }

    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<crate::value::Value>) {
        self.to_tokens_for_dialect(dialect).finalize(dialect, debug, pretty)
    }
}

// =============================================================================
// CTE
// =============================================================================

#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct Cte {
    pub name: String,
    pub columns: Option<Vec<String>>,
    pub query: Box<Query>,
    pub recursive: bool,
}

impl Cte {
    pub fn new(name: impl Into<String>, query: Query) -> Self {
        Self {
            name: name.into(),
            columns: None,
            query: Box::new(query),
            recursive: false,
        }
    }

    pub fn recursive(name: impl Into<String>, query: Query) -> Self {
        Self {
            name: name.into(),
            columns: None,
            query: Box::new(query),
            recursive: true,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()));

        if let Some(cols) = &self.columns {
            ts.space().lparen();
            for (i, col) in cols.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(col.clone()));
            }
            ts.rparen();
        }

        ts.space()
            .push(Token::As)
            .space()
            .lparen()
            .newline()
            .append(&self.query.to_tokens_for_dialect(dialect))
            .newline()
            .rparen();

        ts
    }
}

// =============================================================================
// Query
// =============================================================================

/// Row-lock mode for a trailing `FOR ...` clause on a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

impl LockMode {
    fn keywords(&self) -> &'static str {
        match self {
            LockMode::Update => "UPDATE",
            LockMode::NoKeyUpdate => "NO KEY UPDATE",
            LockMode::Share => "SHARE",
            LockMode::KeyShare => "KEY SHARE",
        }
    }
}

#[derive(Debug, Clone, Default)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or finalize()"]
pub struct Query {
    pub with: Vec<Cte>,
    pub select: Vec<SelectExpr>,
    pub distinct: bool,
    /// `DISTINCT ON (...)` expressions (PostgreSQL-family only, gated by
    /// `dialect.supports_distinct_on()`); mutually exclusive with a plain
    /// `distinct` in practice, though nothing stops both being set.
    pub distinct_on: Vec<ExprNode>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_clause: Option<ExprNode>,
    pub group_by: Vec<ExprNode>,
    pub having: Option<ExprNode>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
    pub lock: Option<LockMode>,
    pub set_op: Option<Box<SetOperation>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cte(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(Into::into).collect();
        self
    }

    pub fn select_star(mut self) -> Self {
        self.select = vec![SelectExpr::new(expr::star().into_node())];
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// `SELECT DISTINCT ON (exprs) ...`. Ignored at render time by
    /// dialects that don't support it (§4.1).
    pub fn distinct_on<T: TypeClass>(mut self, exprs: Vec<Expr<T>>) -> Self {
        self.distinct_on = exprs.into_iter().map(Expr::into_node).collect();
        self
    }

    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr<BoolClass>) -> Self {
        self.joins.push(Join {
            join_type,
            table,
            on: Some(on.into_node()),
        });
        self
    }

    pub fn inner_join(self, table: TableRef, on: Expr<BoolClass>) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    pub fn left_join(self, table: TableRef, on: Expr<BoolClass>) -> Self {
        self.join(JoinType::Left, table, on)
    }

    pub fn right_join(self, table: TableRef, on: Expr<BoolClass>) -> Self {
        self.join(JoinType::Right, table, on)
    }

    pub fn full_join(self, table: TableRef, on: Expr<BoolClass>) -> Self {
        self.join(JoinType::Full, table, on)
    }

    pub fn cross_join(mut self, table: TableRef) -> Self {
        self.joins.push(Join {
            join_type: JoinType::Cross,
            table,
            on: None,
        });
        self
    }

    /// ANDs onto any existing WHERE condition.
    pub fn filter(mut self, condition: Expr<BoolClass>) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => ExprNode::BinaryOp {
                left: Box::new(existing),
                op: expr::BinaryOperator::And,
                right: Box::new(condition.into_node()),
            },
            None => condition.into_node(),
        });
        self
    }

    pub fn group_by<T: TypeClass>(mut self, exprs: Vec<Expr<T>>) -> Self {
        self.group_by = exprs.into_iter().map(Expr::into_node).collect();
        self
    }

    pub fn having(mut self, condition: Expr<BoolClass>) -> Self {
        self.having = Some(condition.into_node());
        self
    }

    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_offset.get_or_insert_with(Default::default).limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.limit_offset.get_or_insert_with(Default::default).offset = Some(offset);
        self
    }

    pub fn union(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Union, false, other)
    }

    pub fn union_all(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Union, true, other)
    }

    pub fn intersect(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Intersect, false, other)
    }

    pub fn intersect_all(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Intersect, true, other)
    }

    pub fn except(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Except, false, other)
    }

    pub fn except_all(self, other: Query) -> SetOperation {
        SetOperation::new(self, SetOpType::Except, true, other)
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        if let Some(set_op) = &self.set_op {
            return set_op.to_tokens_for_dialect(dialect);
        }

        let mut ts = TokenStream::new();

        if !self.with.is_empty() {
            ts.push(Token::With);
            if self.with.iter().any(|cte| cte.recursive) {
                ts.space().push(Token::Recursive);
            }
            ts.space();
            for (i, cte) in self.with.iter().enumerate() {
                if i > 0 {
                    ts.comma().newline();
                }
                ts.append(&cte.to_tokens_for_dialect(dialect));
            }
            ts.newline();
        }

        ts.push(Token::Select);
        if !self.distinct_on.is_empty() && dialect.supports_distinct_on() {
            ts.space().push(Token::Distinct).space();
            ts.push(Token::RawLiteral("ON".into())).lparen();
            for (i, expr) in self.distinct_on.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(dialect));
            }
            ts.rparen();
        } else if self.distinct {
            ts.space().push(Token::Distinct);
        }

        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            ts.append(&select_expr.to_tokens_for_dialect(dialect));
        }

        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            ts.append(&from.to_tokens_for_dialect(dialect));
        }

        for join in &self.joins {
            ts.newline();
            ts.append(&join.to_tokens_for_dialect(dialect));
        }

        if let Some(where_clause) = &self.where_clause {
            ts.newline().push(Token::Where).space();
            ts.append(&where_clause.to_tokens(dialect));
        }

        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(dialect));
            }
        }

        if let Some(having) = &self.having {
            ts.newline().push(Token::Having).space();
            ts.append(&having.to_tokens(dialect));
        }

        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens_for_dialect(dialect));
            }
        }

        if let Some(lo) = &self.limit_offset {
            ts.newline();
            ts.append(&lo.to_tokens(dialect));
        }

        if let Some(mode) = &self.lock {
            ts.newline();
            ts.push(Token::RawLiteral(format!("FOR {}", mode.keywords())));
        }

        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).to_sql(dialect)
    }

    /// Render parameterized SQL plus its bound argument vector.
    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<crate::value::Value>) {
        self.to_tokens_for_dialect(dialect).finalize(dialect, debug, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{col, count_star, lit_int, sum};
    use crate::sql::expr::{IntegerClass, StringClass};

    #[test]
    fn simple_select_renders_fields_in_order() {
        let query = Query::new()
            .select(vec![
                col::<IntegerClass>("u", "id").into(),
                col::<StringClass>("u", "name").into(),
            ])
            .from(TableRef::new("users").with_alias("u"));

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("\"u\".\"id\""));
        assert!(sql.contains("\"u\".\"name\""));
        assert!(sql.contains("FROM \"users\" AS \"u\""));
    }

    #[test]
    fn select_star_renders_asterisk() {
        let query = Query::new().select_star().from(TableRef::new("users"));
        assert_eq!(query.to_sql(Dialect::Postgres), "SELECT * FROM \"users\"");
    }

    #[test]
    fn filter_chains_with_and() {
        let query = Query::new()
            .select_star()
            .from(TableRef::new("users"))
            .filter(col::<IntegerClass>("users", "age").gte(lit_int(18)))
            .filter(col::<IntegerClass>("users", "age").lte(lit_int(65)));

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("WHERE"));
        assert!(sql.contains("AND"));
    }

    #[test]
    fn join_renders_on_clause() {
        let query = Query::new()
            .select_star()
            .from(TableRef::new("users").with_alias("u"))
            .inner_join(
                TableRef::new("orders").with_alias("o"),
                col::<IntegerClass>("u", "id").eq(col::<IntegerClass>("o", "user_id")),
            );

        let sql = query.to_sql(Dialect::MySql);
        assert!(sql.contains("INNER JOIN"));
        assert!(sql.contains("ON"));
    }

    #[test]
    fn group_by_and_having() {
        let query = Query::new()
            .select(vec![
                col::<StringClass>("orders", "region").into(),
                sum(col::<IntegerClass>("orders", "amount")).alias("total"),
            ])
            .from(TableRef::new("orders"))
            .group_by(vec![col::<StringClass>("orders", "region")])
            .having(sum(col::<IntegerClass>("orders", "amount")).gt(lit_int(1000)));

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains("HAVING"));
    }

    #[test]
    fn order_by_with_nulls_dropped_on_mysql() {
        let query = Query::new()
            .select_star()
            .from(TableRef::new("users"))
            .order_by(vec![OrderByExpr::desc(col::<IntegerClass>("users", "age")).nulls_last()]);

        let postgres_sql = query.to_sql(Dialect::Postgres);
        let mysql_sql = query.to_sql(Dialect::MySql);
        assert!(postgres_sql.contains("NULLS LAST"));
        assert!(!mysql_sql.contains("NULLS"));
    }

    #[test]
    fn limit_offset_renders() {
        let query = Query::new()
            .select_star()
            .from(TableRef::new("users"))
            .order_by(vec![OrderByExpr::asc(col::<IntegerClass>("users", "id"))])
            .limit(10)
            .offset(20);

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("LIMIT 10"));
        assert!(sql.contains("OFFSET 20"));
    }

    #[test]
    fn distinct_renders() {
        let query = Query::new()
            .select(vec![col::<StringClass>("products", "category").into()])
            .distinct()
            .from(TableRef::new("products"));

        assert!(query.to_sql(Dialect::Postgres).contains("SELECT DISTINCT"));
    }

    #[test]
    fn cte_renders_with_clause() {
        let inner = Query::new()
            .select(vec![
                col::<StringClass>("orders", "region").into(),
                sum(col::<IntegerClass>("orders", "amount")).alias("total"),
            ])
            .from(TableRef::new("orders"))
            .group_by(vec![col::<StringClass>("orders", "region")]);

        let query = Query::new()
            .with_cte(Cte::new("regional_totals", inner))
            .select_star()
            .from(TableRef::new("regional_totals"))
            .filter(col::<IntegerClass>("regional_totals", "total").gt(lit_int(10000)));

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("WITH"));
        assert!(sql.contains("regional_totals"));
    }

    #[test]
    fn union_renders() {
        let q1 = Query::new()
            .select(vec![col::<StringClass>("customers", "email").into()])
            .from(TableRef::new("customers"));
        let q2 = Query::new()
            .select(vec![col::<StringClass>("suppliers", "email").into()])
            .from(TableRef::new("suppliers"));

        let sql = q1.union(q2).to_sql(Dialect::Postgres);
        assert!(sql.contains("UNION"));
        assert!(!sql.contains("UNION ALL"));
    }

    #[test]
    fn union_all_renders() {
        let q1 = Query::new()
            .select(vec![col::<IntegerClass>("t1", "id").into()])
            .from(TableRef::new("t1"));
        let q2 = Query::new()
            .select(vec![col::<IntegerClass>("t2", "id").into()])
            .from(TableRef::new("t2"));

        assert!(q1.union_all(q2).to_sql(Dialect::Postgres).contains("UNION ALL"));
    }

    #[test]
    fn chained_set_operations() {
        let q1 = Query::new()
            .select(vec![col::<IntegerClass>("t1", "id").into()])
            .from(TableRef::new("t1"));
        let q2 = Query::new()
            .select(vec![col::<IntegerClass>("t2", "id").into()])
            .from(TableRef::new("t2"));
        let q3 = Query::new()
            .select(vec![col::<IntegerClass>("t3", "id").into()])
            .from(TableRef::new("t3"));

        let sql = q1.union(q2).chain(SetOpType::Union, true, q3).to_sql(Dialect::Postgres);
        assert!(sql.contains("t1"));
        assert!(sql.contains("t2"));
        assert!(sql.contains("t3"));
        assert!(sql.contains("UNION ALL"));
    }

    #[test]
    fn qrm_projection_aliases_table_dot_column() {
        let sel = qrm_projection("Album", "Title", col::<StringClass>("Album", "Title"));
        assert_eq!(
            sel.to_tokens_for_dialect(Dialect::Postgres).to_sql(Dialect::Postgres),
            "\"Album\".\"Title\" AS \"Album.Title\""
        );
    }

    #[test]
    fn finalize_parameterizes_filter_values() {
        let query = Query::new()
            .select_star()
            .from(TableRef::new("users"))
            .filter(col::<IntegerClass>("users", "id").eq(lit_int(42)));

        let (sql, args) = query.finalize(Dialect::Postgres, false, false);
        assert!(sql.contains("$1"));
        assert_eq!(args, vec![crate::value::Value::Int(42)]);
    }
}

/// Whole-statement snapshots for the larger multi-clause fixtures, kept
/// alongside the source rather than duplicated as separate golden files.
#[cfg(test)]
mod snapshot_tests {
    use super::*;
    use crate::sql::expr::{col, lit_bool, lit_int};
    use crate::sql::expr::{BoolClass, IntegerClass, StringClass};
    use insta::assert_snapshot;

    #[test]
    fn multi_clause_select_with_join_filter_and_order_by() {
        let query = Query::new()
            .select(vec![
                col::<IntegerClass>("u", "id").into(),
                col::<StringClass>("u", "name").into(),
            ])
            .from(TableRef::new("users").with_alias("u"))
            .inner_join(
                TableRef::new("orders").with_alias("o"),
                col::<IntegerClass>("u", "id").eq(col::<IntegerClass>("o", "user_id")),
            )
            .filter(col::<IntegerClass>("o", "total").gt(lit_int(100)))
            .order_by(vec![OrderByExpr::desc(col::<IntegerClass>("o", "total"))]);

        let sql = query.to_sql(Dialect::Postgres);
        assert_snapshot!(sql);
    }

    #[test]
    fn union_all_of_two_filtered_selects() {
        let q1 = Query::new()
            .select(vec![col::<IntegerClass>("active_users", "id").into()])
            .from(TableRef::new("active_users"))
            .filter(col::<BoolClass>("active_users", "verified").eq(lit_bool(true)));
        let q2 = Query::new()
            .select(vec![col::<IntegerClass>("pending_users", "id").into()])
            .from(TableRef::new("pending_users"))
            .filter(col::<BoolClass>("pending_users", "verified").eq(lit_bool(false)));

        let sql = q1.union_all(q2).to_sql(Dialect::Postgres);
        assert_snapshot!(sql);
    }
}
