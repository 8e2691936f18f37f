//! Expression algebra - the typed core of SQL expression building.
//!
//! `ExprNode` is the untyped, tagged-variant tree that actually knows how to
//! render itself into a [`TokenStream`]. `Expr<T>` wraps one `ExprNode` with
//! a zero-sized type-class marker `T`; the marker carries no runtime state,
//! it exists purely so the compiler can reject ill-typed combinations (an
//! `Expr<IntegerClass>` has no `.like()`, an `Expr<StringClass>` has no
//! `.add()`). This replaces a parent-back-pointer mixin hierarchy with a
//! single tagged-variant type plus generic impls gated by marker traits.

use super::dialect::{Dialect, SqlDialect};
use super::query::{Query, SelectExpr};
use super::token::{Token, TokenStream};
use crate::types::SqlDataType;
use crate::value::Value;
use std::marker::PhantomData;

// ============================================================================
// Type classes
// ============================================================================

/// A static SQL category. Determines which operators an `Expr<T>` exposes.
pub trait TypeClass: Clone + Copy + std::fmt::Debug + 'static {}

macro_rules! type_class {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;
        impl TypeClass for $name {}
    };
}

type_class!(BoolClass);
type_class!(IntegerClass);
type_class!(FloatClass);
type_class!(NumericClass);
type_class!(StringClass);
type_class!(DateClass);
type_class!(TimeClass);
type_class!(TimestampClass);
type_class!(TimestampTzClass);
type_class!(IntervalClass);
type_class!(BytesClass);
type_class!(RowClass);
/// Marker for expressions whose type class the crate cannot infer (raw SQL,
/// opaque function calls). Reinterpret with `.as_bool()`, `.as_int()`, etc.
/// before using a typed combinator.
type_class!(Untyped);

/// Ordering comparisons (`<`, `<=`, `>`, `>=`, `BETWEEN`) are available.
pub trait Ordered: TypeClass {}
impl Ordered for IntegerClass {}
impl Ordered for FloatClass {}
impl Ordered for NumericClass {}
impl Ordered for DateClass {}
impl Ordered for TimeClass {}
impl Ordered for TimestampClass {}
impl Ordered for TimestampTzClass {}

/// Arithmetic (`+ - * / %`, power, negation) is available.
pub trait Arithmetic: TypeClass {}
impl Arithmetic for IntegerClass {}
impl Arithmetic for FloatClass {}
impl Arithmetic for NumericClass {}

/// `+`/`-` against an `Expr<IntervalClass>` is available.
pub trait Temporal: TypeClass {}
impl Temporal for DateClass {}
impl Temporal for TimeClass {}
impl Temporal for TimestampClass {}
impl Temporal for TimestampTzClass {}

// ============================================================================
// Untyped AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Like,
    NotLike,
    ILike,
    NotILike,
    SimilarTo,
    RegexMatch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryPosition {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Not,
    Neg,
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    IsUnknown,
    IsNotUnknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone)]
pub struct WindowOrderBy {
    pub expr: ExprNode,
    pub dir: SortDir,
    pub nulls: Option<NullsOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowFrameKind {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowFrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFrame {
    pub kind: WindowFrameKind,
    pub start: WindowFrameBound,
    pub end: Option<WindowFrameBound>,
}

impl WindowFrame {
    pub fn rows_unbounded_preceding() -> Self {
        Self {
            kind: WindowFrameKind::Rows,
            start: WindowFrameBound::UnboundedPreceding,
            end: Some(WindowFrameBound::CurrentRow),
        }
    }

    pub fn rolling(periods: u64) -> Self {
        Self {
            kind: WindowFrameKind::Rows,
            start: WindowFrameBound::Preceding(periods),
            end: Some(WindowFrameBound::CurrentRow),
        }
    }
}

/// The untyped, tagged-variant expression tree. Every node's rendering is
/// pure: given a dialect, it writes a deterministic token fragment.
#[derive(Debug, Clone)]
pub enum ExprNode {
    Column {
        table: Option<String>,
        column: String,
    },
    /// A structural literal rendered as a bare SQL keyword (`NULL`, or the
    /// `TRUE`/`FALSE` an empty `IN` list collapses to). Never parameterized.
    Literal(Value),
    /// A caller-supplied value, always rendered through the argument vector
    /// (or inlined in debug mode).
    Parameter(Value),
    UnaryOp {
        op: UnaryOperator,
        expr: Box<ExprNode>,
        position: UnaryPosition,
    },
    BinaryOp {
        left: Box<ExprNode>,
        op: BinaryOperator,
        right: Box<ExprNode>,
    },
    Func {
        name: String,
        args: Vec<ExprNode>,
        distinct: bool,
    },
    Cast {
        expr: Box<ExprNode>,
        target: SqlDataType,
    },
    Case {
        operand: Option<Box<ExprNode>>,
        when_clauses: Vec<(ExprNode, ExprNode)>,
        else_clause: Option<Box<ExprNode>>,
    },
    SubSelect(Box<Query>),
    In {
        expr: Box<ExprNode>,
        values: Vec<ExprNode>,
        negated: bool,
    },
    InSubquery {
        expr: Box<ExprNode>,
        subquery: Box<Query>,
        negated: bool,
    },
    Between {
        expr: Box<ExprNode>,
        low: Box<ExprNode>,
        high: Box<ExprNode>,
        negated: bool,
    },
    IsNull {
        expr: Box<ExprNode>,
        negated: bool,
    },
    Star {
        table: Option<String>,
    },
    Paren(Box<ExprNode>),
    Window {
        function: Box<ExprNode>,
        partition_by: Vec<ExprNode>,
        order_by: Vec<WindowOrderBy>,
        frame: Option<WindowFrame>,
    },
    RowTuple(Vec<ExprNode>),
    /// Escape hatch for text the builder has no structured representation
    /// for. The caller is responsible for correctness; this is a SQL
    /// injection risk if any part of it derives from untrusted input.
    Raw(String),
}

impl ExprNode {
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            ExprNode::Column { table, column } => match table {
                Some(table) => {
                    ts.push(Token::Ident(table.clone()))
                        .push(Token::Dot)
                        .push(Token::Ident(column.clone()));
                }
                None => {
                    ts.push(Token::Ident(column.clone()));
                }
            },
            ExprNode::Literal(value) => {
                render_literal_keyword(&mut ts, value);
            }
            ExprNode::Parameter(value) => {
                ts.push(Token::Param(value.clone()));
            }
            ExprNode::UnaryOp {
                op,
                expr,
                position,
            } => {
                let inner = expr.to_tokens(dialect);
                match position {
                    UnaryPosition::Prefix => {
                        ts.push(unary_prefix_token(*op)).space();
                        ts.lparen().append(&inner).rparen();
                    }
                    UnaryPosition::Postfix => {
                        ts.lparen().append(&inner).rparen();
                        ts.space().extend(unary_postfix_tokens(*op));
                    }
                }
            }
            ExprNode::BinaryOp { left, op, right } => {
                render_binary_op(&mut ts, dialect, left, *op, right);
            }
            ExprNode::Func {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens(dialect));
                }
                ts.rparen();
            }
            ExprNode::Cast { expr, target } => {
                ts.push(Token::Cast).lparen().append(&expr.to_tokens(dialect));
                ts.space().push(Token::As).space();
                ts.push(Token::Raw(dialect.emit_data_type(target)));
                ts.rparen();
            }
            ExprNode::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                if let Some(operand) = operand {
                    ts.space().append(&operand.to_tokens(dialect));
                }
                for (when, then) in when_clauses {
                    ts.space()
                        .push(Token::When)
                        .space()
                        .append(&when.to_tokens(dialect))
                        .space()
                        .push(Token::Then)
                        .space()
                        .append(&then.to_tokens(dialect));
                }
                if let Some(else_clause) = else_clause {
                    ts.space()
                        .push(Token::Else)
                        .space()
                        .append(&else_clause.to_tokens(dialect));
                }
                ts.space().push(Token::End);
            }
            ExprNode::SubSelect(query) => {
                ts.lparen().append(&query.to_tokens_for_dialect(dialect)).rparen();
            }
            ExprNode::In {
                expr,
                values,
                negated,
            } => {
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.to_tokens(dialect)).space();
                    if *negated {
                        ts.push(Token::Not).space();
                    }
                    ts.push(Token::In).lparen();
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&v.to_tokens(dialect));
                    }
                    ts.rparen();
                }
            }
            ExprNode::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                ts.append(&expr.to_tokens(dialect)).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).lparen();
                ts.append(&subquery.to_tokens_for_dialect(dialect));
                ts.rparen();
            }
            ExprNode::Between {
                expr,
                low,
                high,
                negated,
            } => {
                ts.append(&expr.to_tokens(dialect)).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::Between)
                    .space()
                    .append(&low.to_tokens(dialect))
                    .space()
                    .push(Token::And)
                    .space()
                    .append(&high.to_tokens(dialect));
            }
            ExprNode::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens(dialect)).space().push(Token::Is).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::Null);
            }
            ExprNode::Star { table } => match table {
                Some(table) => {
                    ts.push(Token::Ident(table.clone())).push(Token::Dot).push(Token::Star);
                }
                None => {
                    ts.push(Token::Star);
                }
            },
            ExprNode::Paren(inner) => {
                ts.lparen().append(&inner.to_tokens(dialect)).rparen();
            }
            ExprNode::Window {
                function,
                partition_by,
                order_by,
                frame,
            } => {
                ts.append(&function.to_tokens(dialect)).space().push(Token::Over).lparen();
                if !partition_by.is_empty() {
                    ts.push(Token::PartitionBy).space();
                    for (i, e) in partition_by.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&e.to_tokens(dialect));
                    }
                    ts.space();
                }
                if !order_by.is_empty() {
                    ts.push(Token::OrderBy).space();
                    for (i, o) in order_by.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&o.expr.to_tokens(dialect)).space();
                        ts.push(if o.dir == SortDir::Asc { Token::Asc } else { Token::Desc });
                        if let Some(nulls) = o.nulls {
                            if dialect.supports_nulls_ordering() {
                                ts.space().push(Token::Nulls).space();
                                ts.push(if nulls == NullsOrder::First { Token::First } else { Token::Last });
                            }
                        }
                    }
                    if frame.is_some() {
                        ts.space();
                    }
                }
                if let Some(frame) = frame {
                    render_window_frame(&mut ts, dialect, frame);
                }
                ts.rparen();
            }
            ExprNode::RowTuple(exprs) => {
                ts.lparen();
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&e.to_tokens(dialect));
                }
                ts.rparen();
            }
            ExprNode::Raw(text) => {
                ts.push(Token::Raw(text.clone()));
            }
        }
        ts
    }

    fn is_null_literal(&self) -> bool {
        matches!(self, ExprNode::Literal(Value::Null))
    }
}

fn render_literal_keyword(ts: &mut TokenStream, value: &Value) {
    match value {
        Value::Null => {
            ts.push(Token::Null);
        }
        Value::Bool(true) => {
            ts.push(Token::True);
        }
        Value::Bool(false) => {
            ts.push(Token::False);
        }
        other => {
            // Structural literals are only ever Null/Bool in practice; any
            // other value reaching here still renders as a bound parameter
            // so it is never silently inlined unparameterized.
            ts.push(Token::Param(other.clone()));
        }
    }
}

fn unary_prefix_token(op: UnaryOperator) -> Token {
    match op {
        UnaryOperator::Not => Token::Not,
        UnaryOperator::Neg => Token::Minus,
        _ => unreachable!("postfix-only operator in prefix position"),
    }
}

fn unary_postfix_tokens(op: UnaryOperator) -> Vec<Token> {
    match op {
        UnaryOperator::IsTrue => vec![Token::Is, Token::Space, Token::True],
        UnaryOperator::IsNotTrue => vec![Token::Is, Token::Space, Token::Not, Token::Space, Token::True],
        UnaryOperator::IsFalse => vec![Token::Is, Token::Space, Token::False],
        UnaryOperator::IsNotFalse => vec![Token::Is, Token::Space, Token::Not, Token::Space, Token::False],
        UnaryOperator::IsUnknown => vec![Token::Is, Token::Space, Token::Null],
        UnaryOperator::IsNotUnknown => vec![Token::Is, Token::Space, Token::Not, Token::Space, Token::Null],
        _ => unreachable!("prefix-only operator in postfix position"),
    }
}

fn render_binary_op(
    ts: &mut TokenStream,
    dialect: Dialect,
    left: &ExprNode,
    op: BinaryOperator,
    right: &ExprNode,
) {
    // NULL comparisons rewrite to IS [NOT] NULL: SQL equality with NULL is
    // always UNKNOWN, never TRUE.
    if matches!(op, BinaryOperator::Eq | BinaryOperator::NotEq) && right.is_null_literal() {
        let negated = op == BinaryOperator::NotEq;
        ts.append(&left.to_tokens(dialect))
            .space()
            .push(Token::Is)
            .space();
        if negated {
            ts.push(Token::Not).space();
        }
        ts.push(Token::Null);
        return;
    }

    if op == BinaryOperator::Concat && !dialect.supports_concat_operator() {
        ts.push(Token::FunctionName("CONCAT".into()))
            .lparen()
            .append(&left.to_tokens(dialect))
            .comma()
            .space()
            .append(&right.to_tokens(dialect))
            .rparen();
        return;
    }

    ts.lparen().append(&left.to_tokens(dialect)).space();
    ts.extend(binary_operator_tokens(op, dialect));
    ts.space().append(&right.to_tokens(dialect)).rparen();
}

fn binary_operator_tokens(op: BinaryOperator, dialect: Dialect) -> Vec<Token> {
    match op {
        BinaryOperator::Eq => vec![Token::Eq],
        BinaryOperator::NotEq => vec![Token::NotEq],
        BinaryOperator::IsDistinctFrom => {
            vec![Token::Is, Token::Space, Token::Raw("DISTINCT FROM".into())]
        }
        BinaryOperator::IsNotDistinctFrom => vec![
            Token::Is,
            Token::Space,
            Token::Not,
            Token::Space,
            Token::Raw("DISTINCT FROM".into()),
        ],
        BinaryOperator::Lt => vec![Token::Lt],
        BinaryOperator::Lte => vec![Token::Lte],
        BinaryOperator::Gt => vec![Token::Gt],
        BinaryOperator::Gte => vec![Token::Gte],
        BinaryOperator::And => vec![Token::And],
        BinaryOperator::Or => vec![Token::Or],
        BinaryOperator::Plus => vec![Token::Plus],
        BinaryOperator::Minus => vec![Token::Minus],
        BinaryOperator::Mul => vec![Token::Mul],
        BinaryOperator::Div => vec![Token::Div],
        BinaryOperator::Mod => vec![Token::Mod],
        BinaryOperator::Concat => vec![Token::Concat],
        BinaryOperator::BitAnd => vec![Token::BitAnd],
        BinaryOperator::BitOr => vec![Token::BitOr],
        BinaryOperator::BitXor => vec![Token::BitXor],
        BinaryOperator::ShiftLeft => vec![Token::ShiftLeft],
        BinaryOperator::ShiftRight => vec![Token::ShiftRight],
        BinaryOperator::Like => vec![Token::Like],
        BinaryOperator::NotLike => vec![Token::Not, Token::Space, Token::Like],
        BinaryOperator::ILike => {
            if dialect.supports_ilike() {
                vec![Token::Ilike]
            } else {
                vec![Token::Like]
            }
        }
        BinaryOperator::NotILike => {
            if dialect.supports_ilike() {
                vec![Token::Not, Token::Space, Token::Ilike]
            } else {
                vec![Token::Not, Token::Space, Token::Like]
            }
        }
        BinaryOperator::SimilarTo => vec![Token::SimilarTo],
        BinaryOperator::RegexMatch => vec![Token::Tilde],
    }
}

fn render_window_frame(ts: &mut TokenStream, dialect: Dialect, frame: &WindowFrame) {
    let kind = if frame.kind == WindowFrameKind::Groups && !dialect.supports_groups_frame() {
        WindowFrameKind::Rows
    } else {
        frame.kind
    };
    ts.push(match kind {
        WindowFrameKind::Rows => Token::Rows,
        WindowFrameKind::Range => Token::Range,
        WindowFrameKind::Groups => Token::Groups,
    });
    ts.space();
    if let Some(end) = frame.end {
        ts.push(Token::Raw("BETWEEN".into())).space();
        render_frame_bound(ts, frame.start);
        ts.space().push(Token::And).space();
        render_frame_bound(ts, end);
    } else {
        render_frame_bound(ts, frame.start);
    }
}

fn render_frame_bound(ts: &mut TokenStream, bound: WindowFrameBound) {
    match bound {
        WindowFrameBound::UnboundedPreceding => {
            ts.push(Token::Unbounded).space().push(Token::Preceding);
        }
        WindowFrameBound::Preceding(n) => {
            ts.push(Token::RawLiteral(n.to_string())).space().push(Token::Preceding);
        }
        WindowFrameBound::CurrentRow => {
            ts.push(Token::CurrentRow);
        }
        WindowFrameBound::Following(n) => {
            ts.push(Token::RawLiteral(n.to_string())).space().push(Token::Following);
        }
        WindowFrameBound::UnboundedFollowing => {
            ts.push(Token::Unbounded).space().push(Token::Following);
        }
    }
}

// ============================================================================
// Typed wrapper
// ============================================================================

/// A type-class-tagged expression. `T` is a zero-sized marker; it carries no
/// data, only compile-time information about which operators are legal.
#[derive(Debug, Clone)]
pub struct Expr<T> {
    node: ExprNode,
    _marker: PhantomData<T>,
}

impl<T: TypeClass> Expr<T> {
    pub(crate) fn from_node(node: ExprNode) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    pub fn node(&self) -> &ExprNode {
        &self.node
    }

    pub fn into_node(self) -> ExprNode {
        self.node
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        self.node.to_tokens(dialect)
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.node.to_tokens(dialect).to_sql(dialect)
    }

    pub fn alias(self, name: impl Into<String>) -> SelectExpr {
        SelectExpr::new(self.node).with_alias(name)
    }

    fn binary<R: TypeClass>(self, op: BinaryOperator, rhs: Expr<R>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op,
            right: Box::new(rhs.node),
        })
    }

    pub fn eq(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::Eq, rhs.into())
    }

    pub fn ne(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::NotEq, rhs.into())
    }

    pub fn is_distinct_from(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::IsDistinctFrom, rhs.into())
    }

    pub fn is_not_distinct_from(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::IsNotDistinctFrom, rhs.into())
    }

    pub fn is_null(self) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::IsNull {
            expr: Box::new(self.node),
            negated: false,
        })
    }

    pub fn is_not_null(self) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::IsNull {
            expr: Box::new(self.node),
            negated: true,
        })
    }

    pub fn in_list(self, values: impl IntoIterator<Item = Expr<T>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::In {
            expr: Box::new(self.node),
            values: values.into_iter().map(|v| v.node).collect(),
            negated: false,
        })
    }

    pub fn not_in(self, values: impl IntoIterator<Item = Expr<T>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::In {
            expr: Box::new(self.node),
            values: values.into_iter().map(|v| v.node).collect(),
            negated: true,
        })
    }

    pub fn in_subquery(self, subquery: Query) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::InSubquery {
            expr: Box::new(self.node),
            subquery: Box::new(subquery),
            negated: false,
        })
    }

    pub fn not_in_subquery(self, subquery: Query) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::InSubquery {
            expr: Box::new(self.node),
            subquery: Box::new(subquery),
            negated: true,
        })
    }
}

impl<T: Ordered> Expr<T> {
    pub fn lt(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::Lt, rhs.into())
    }

    pub fn lte(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::Lte, rhs.into())
    }

    pub fn gt(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::Gt, rhs.into())
    }

    pub fn gte(self, rhs: impl Into<Expr<T>>) -> Expr<BoolClass> {
        self.binary(BinaryOperator::Gte, rhs.into())
    }

    pub fn between(self, low: impl Into<Expr<T>>, high: impl Into<Expr<T>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::Between {
            expr: Box::new(self.node),
            low: Box::new(low.into().node),
            high: Box::new(high.into().node),
            negated: false,
        })
    }

    pub fn not_between(self, low: impl Into<Expr<T>>, high: impl Into<Expr<T>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::Between {
            expr: Box::new(self.node),
            low: Box::new(low.into().node),
            high: Box::new(high.into().node),
            negated: true,
        })
    }
}

impl<T: Arithmetic> Expr<T> {
    fn arith(self, op: BinaryOperator, rhs: Expr<T>) -> Expr<T> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op,
            right: Box::new(rhs.node),
        })
    }

    pub fn add(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        self.arith(BinaryOperator::Plus, rhs.into())
    }

    pub fn sub(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        self.arith(BinaryOperator::Minus, rhs.into())
    }

    pub fn mul(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        self.arith(BinaryOperator::Mul, rhs.into())
    }

    pub fn div(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        self.arith(BinaryOperator::Div, rhs.into())
    }

    pub fn rem(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        self.arith(BinaryOperator::Mod, rhs.into())
    }

    pub fn pow(self, rhs: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Func {
            name: "POWER".into(),
            args: vec![self.node, rhs.into().node],
            distinct: false,
        })
    }

    pub fn neg(self) -> Expr<T> {
        Expr::from_node(ExprNode::UnaryOp {
            op: UnaryOperator::Neg,
            expr: Box::new(self.node),
            position: UnaryPosition::Prefix,
        })
    }
}

impl Expr<IntegerClass> {
    fn bitwise(self, op: BinaryOperator, rhs: Expr<IntegerClass>) -> Expr<IntegerClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op,
            right: Box::new(rhs.node),
        })
    }

    pub fn bit_and(self, rhs: impl Into<Expr<IntegerClass>>) -> Expr<IntegerClass> {
        self.bitwise(BinaryOperator::BitAnd, rhs.into())
    }

    pub fn bit_or(self, rhs: impl Into<Expr<IntegerClass>>) -> Expr<IntegerClass> {
        self.bitwise(BinaryOperator::BitOr, rhs.into())
    }

    pub fn bit_xor(self, rhs: impl Into<Expr<IntegerClass>>) -> Expr<IntegerClass> {
        self.bitwise(BinaryOperator::BitXor, rhs.into())
    }

    pub fn shift_left(self, rhs: impl Into<Expr<IntegerClass>>) -> Expr<IntegerClass> {
        self.bitwise(BinaryOperator::ShiftLeft, rhs.into())
    }

    pub fn shift_right(self, rhs: impl Into<Expr<IntegerClass>>) -> Expr<IntegerClass> {
        self.bitwise(BinaryOperator::ShiftRight, rhs.into())
    }
}

impl Expr<BoolClass> {
    pub fn and(self, rhs: impl Into<Expr<BoolClass>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op: BinaryOperator::And,
            right: Box::new(rhs.into().node),
        })
    }

    pub fn or(self, rhs: impl Into<Expr<BoolClass>>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op: BinaryOperator::Or,
            right: Box::new(rhs.into().node),
        })
    }

    pub fn not(self) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.node),
            position: UnaryPosition::Prefix,
        })
    }

    fn postfix(self, op: UnaryOperator) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::UnaryOp {
            op,
            expr: Box::new(self.node),
            position: UnaryPosition::Postfix,
        })
    }

    pub fn is_true(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsTrue)
    }

    pub fn is_not_true(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsNotTrue)
    }

    pub fn is_false(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsFalse)
    }

    pub fn is_not_false(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsNotFalse)
    }

    pub fn is_unknown(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsUnknown)
    }

    pub fn is_not_unknown(self) -> Expr<BoolClass> {
        self.postfix(UnaryOperator::IsNotUnknown)
    }
}

impl Expr<StringClass> {
    fn str_binary(self, op: BinaryOperator, rhs: Expr<StringClass>) -> Expr<BoolClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op,
            right: Box::new(rhs.node),
        })
    }

    pub fn like(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::Like, pattern.into())
    }

    pub fn not_like(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::NotLike, pattern.into())
    }

    pub fn ilike(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::ILike, pattern.into())
    }

    pub fn not_ilike(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::NotILike, pattern.into())
    }

    pub fn similar_to(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::SimilarTo, pattern.into())
    }

    pub fn matches(self, pattern: impl Into<Expr<StringClass>>) -> Expr<BoolClass> {
        self.str_binary(BinaryOperator::RegexMatch, pattern.into())
    }

    pub fn concat(self, rhs: impl Into<Expr<StringClass>>) -> Expr<StringClass> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op: BinaryOperator::Concat,
            right: Box::new(rhs.into().node),
        })
    }
}

impl<T: Temporal> Expr<T> {
    pub fn plus_interval(self, interval: Expr<IntervalClass>) -> Expr<T> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op: BinaryOperator::Plus,
            right: Box::new(interval.node),
        })
    }

    pub fn minus_interval(self, interval: Expr<IntervalClass>) -> Expr<T> {
        Expr::from_node(ExprNode::BinaryOp {
            left: Box::new(self.node),
            op: BinaryOperator::Minus,
            right: Box::new(interval.node),
        })
    }
}

impl Expr<Untyped> {
    pub fn as_bool(self) -> Expr<BoolClass> {
        Expr::from_node(self.node)
    }

    pub fn as_int(self) -> Expr<IntegerClass> {
        Expr::from_node(self.node)
    }

    pub fn as_float(self) -> Expr<FloatClass> {
        Expr::from_node(self.node)
    }

    pub fn as_numeric(self) -> Expr<NumericClass> {
        Expr::from_node(self.node)
    }

    pub fn as_string(self) -> Expr<StringClass> {
        Expr::from_node(self.node)
    }

    pub fn as_timestamp(self) -> Expr<TimestampClass> {
        Expr::from_node(self.node)
    }
}

// Blanket conversions from Rust scalars into the matching typed expression.
impl From<i64> for Expr<IntegerClass> {
    fn from(v: i64) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::Int(v)))
    }
}
impl From<i32> for Expr<IntegerClass> {
    fn from(v: i32) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::Int(v as i64)))
    }
}
impl From<f64> for Expr<FloatClass> {
    fn from(v: f64) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::Float(v)))
    }
}
impl From<bool> for Expr<BoolClass> {
    fn from(v: bool) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::Bool(v)))
    }
}
impl From<&str> for Expr<StringClass> {
    fn from(v: &str) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::String(v.to_string())))
    }
}
impl From<String> for Expr<StringClass> {
    fn from(v: String) -> Self {
        Expr::from_node(ExprNode::Parameter(Value::String(v)))
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// A column reference qualified by its table alias.
pub fn col<T: TypeClass>(table: impl Into<String>, column: impl Into<String>) -> Expr<T> {
    Expr::from_node(ExprNode::Column {
        table: Some(table.into()),
        column: column.into(),
    })
}

/// An unqualified column reference.
pub fn bare_col<T: TypeClass>(column: impl Into<String>) -> Expr<T> {
    Expr::from_node(ExprNode::Column {
        table: None,
        column: column.into(),
    })
}

pub fn lit_int(v: i64) -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Parameter(Value::Int(v)))
}

pub fn lit_float(v: f64) -> Expr<FloatClass> {
    Expr::from_node(ExprNode::Parameter(Value::Float(v)))
}

pub fn lit_str(v: impl Into<String>) -> Expr<StringClass> {
    Expr::from_node(ExprNode::Parameter(Value::String(v.into())))
}

pub fn lit_bool(v: bool) -> Expr<BoolClass> {
    Expr::from_node(ExprNode::Parameter(Value::Bool(v)))
}

/// The untyped SQL `NULL`. Reinterpret with any `Expr<T>::eq`/`ne` (which
/// rewrites to `IS [NOT] NULL`) or with `.as_*()`.
pub fn null<T: TypeClass>() -> Expr<T> {
    Expr::from_node(ExprNode::Literal(Value::Null))
}

pub fn star() -> Expr<Untyped> {
    Expr::from_node(ExprNode::Star { table: None })
}

pub fn table_star(table: impl Into<String>) -> Expr<Untyped> {
    Expr::from_node(ExprNode::Star {
        table: Some(table.into()),
    })
}

/// Escape hatch for text the builder cannot express structurally. The
/// caller is responsible for correctness; never build this from
/// unsanitized input, it is a direct SQL injection vector.
pub fn raw_sql(sql: impl Into<String>) -> Expr<Untyped> {
    Expr::from_node(ExprNode::Raw(sql.into()))
}

pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = ExprNode>) -> Expr<Untyped> {
    Expr::from_node(ExprNode::Func {
        name: name.into(),
        args: args.into_iter().collect(),
        distinct: false,
    })
}

pub fn cast<T: TypeClass, U: TypeClass>(expr: Expr<U>, target: SqlDataType) -> Expr<T> {
    Expr::from_node(ExprNode::Cast {
        expr: Box::new(expr.node),
        target,
    })
}

pub fn count<T: TypeClass>(expr: Expr<T>) -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "COUNT".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn count_star() -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "COUNT".into(),
        args: vec![ExprNode::Star { table: None }],
        distinct: false,
    })
}

pub fn count_distinct<T: TypeClass>(expr: Expr<T>) -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "COUNT".into(),
        args: vec![expr.node],
        distinct: true,
    })
}

pub fn sum<T: Arithmetic>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "SUM".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn avg<T: Arithmetic>(expr: Expr<T>) -> Expr<FloatClass> {
    Expr::from_node(ExprNode::Func {
        name: "AVG".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn min<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "MIN".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn max<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "MAX".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn coalesce<T: TypeClass>(exprs: impl IntoIterator<Item = Expr<T>>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "COALESCE".into(),
        args: exprs.into_iter().map(|e| e.node).collect(),
        distinct: false,
    })
}

// ---- window functions ----

pub fn row_number() -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "ROW_NUMBER".into(),
        args: vec![],
        distinct: false,
    })
}

pub fn rank() -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "RANK".into(),
        args: vec![],
        distinct: false,
    })
}

pub fn dense_rank() -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "DENSE_RANK".into(),
        args: vec![],
        distinct: false,
    })
}

pub fn ntile(buckets: i64) -> Expr<IntegerClass> {
    Expr::from_node(ExprNode::Func {
        name: "NTILE".into(),
        args: vec![ExprNode::Parameter(Value::Int(buckets))],
        distinct: false,
    })
}

pub fn lag<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LAG".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn lag_offset<T: TypeClass>(expr: Expr<T>, offset: i64) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LAG".into(),
        args: vec![expr.node, ExprNode::Parameter(Value::Int(offset))],
        distinct: false,
    })
}

pub fn lag_default<T: TypeClass>(expr: Expr<T>, offset: i64, default: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LAG".into(),
        args: vec![expr.node, ExprNode::Parameter(Value::Int(offset)), default.node],
        distinct: false,
    })
}

pub fn lead<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LEAD".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn lead_offset<T: TypeClass>(expr: Expr<T>, offset: i64) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LEAD".into(),
        args: vec![expr.node, ExprNode::Parameter(Value::Int(offset))],
        distinct: false,
    })
}

pub fn first_value<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "FIRST_VALUE".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn last_value<T: TypeClass>(expr: Expr<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "LAST_VALUE".into(),
        args: vec![expr.node],
        distinct: false,
    })
}

pub fn nth_value<T: TypeClass>(expr: Expr<T>, n: i64) -> Expr<T> {
    Expr::from_node(ExprNode::Func {
        name: "NTH_VALUE".into(),
        args: vec![expr.node, ExprNode::Parameter(Value::Int(n))],
        distinct: false,
    })
}

pub fn percent_rank() -> Expr<FloatClass> {
    Expr::from_node(ExprNode::Func {
        name: "PERCENT_RANK".into(),
        args: vec![],
        distinct: false,
    })
}

pub fn cume_dist() -> Expr<FloatClass> {
    Expr::from_node(ExprNode::Func {
        name: "CUME_DIST".into(),
        args: vec![],
        distinct: false,
    })
}

/// Fluent `.over(...)` for turning an aggregate/ranking call into a window
/// function call.
pub trait WindowExt<T: TypeClass> {
    fn over(
        self,
        partition_by: Vec<ExprNode>,
        order_by: Vec<WindowOrderBy>,
        frame: Option<WindowFrame>,
    ) -> Expr<T>;
}

impl<T: TypeClass> WindowExt<T> for Expr<T> {
    fn over(
        self,
        partition_by: Vec<ExprNode>,
        order_by: Vec<WindowOrderBy>,
        frame: Option<WindowFrame>,
    ) -> Expr<T> {
        if frame.is_some() && order_by.is_empty() {
            panic!("a window frame requires an ORDER BY");
        }
        Expr::from_node(ExprNode::Window {
            function: Box::new(self.node),
            partition_by,
            order_by,
            frame,
        })
    }
}

/// Ascending/descending ordering helper shared with the statement layer.
pub fn order_asc<T: TypeClass>(expr: Expr<T>) -> WindowOrderBy {
    WindowOrderBy {
        expr: expr.node,
        dir: SortDir::Asc,
        nulls: None,
    }
}

pub fn order_desc<T: TypeClass>(expr: Expr<T>) -> WindowOrderBy {
    WindowOrderBy {
        expr: expr.node,
        dir: SortDir::Desc,
        nulls: None,
    }
}

// ---- CASE ----

pub struct CaseBuilder<T: TypeClass> {
    operand: Option<ExprNode>,
    when_clauses: Vec<(ExprNode, ExprNode)>,
    _marker: PhantomData<T>,
}

pub fn case<T: TypeClass>() -> CaseBuilder<T> {
    CaseBuilder {
        operand: None,
        when_clauses: Vec::new(),
        _marker: PhantomData,
    }
}

pub fn case_on<U: TypeClass, T: TypeClass>(operand: Expr<U>) -> CaseBuilder<T> {
    CaseBuilder {
        operand: Some(operand.node),
        when_clauses: Vec::new(),
        _marker: PhantomData,
    }
}

impl<T: TypeClass> CaseBuilder<T> {
    pub fn when(mut self, condition: Expr<BoolClass>, then: Expr<T>) -> Self {
        self.when_clauses.push((condition.node, then.node));
        self
    }

    /// Finish without an `ELSE` branch. At least one `WHEN` is required.
    pub fn build(self) -> Expr<T> {
        assert!(!self.when_clauses.is_empty(), "CASE requires at least one WHEN");
        Expr::from_node(ExprNode::Case {
            operand: self.operand.map(Box::new),
            when_clauses: self.when_clauses,
            else_clause: None,
        })
    }

    pub fn else_(self, else_expr: Expr<T>) -> Expr<T> {
        assert!(!self.when_clauses.is_empty(), "CASE requires at least one WHEN");
        Expr::from_node(ExprNode::Case {
            operand: self.operand.map(Box::new),
            when_clauses: self.when_clauses,
            else_clause: Some(Box::new(else_expr.node)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    fn sql<T: TypeClass>(e: Expr<T>) -> String {
        e.to_sql(Dialect::Postgres)
    }

    #[test]
    fn column_renders_qualified() {
        let e: Expr<IntegerClass> = col("Album", "AlbumId");
        assert_eq!(sql(e), "\"Album\".\"AlbumId\"");
    }

    #[test]
    fn binary_op_wraps_in_parens() {
        let e = col::<IntegerClass>("t", "a").add(col::<IntegerClass>("t", "b"));
        assert_eq!(sql(e), "(\"t\".\"a\" + \"t\".\"b\")");
    }

    #[test]
    fn chained_and_nests_parens() {
        let e = col::<BoolClass>("t", "a")
            .and(col::<BoolClass>("t", "b"))
            .and(col::<BoolClass>("t", "c"));
        assert_eq!(sql(e), "((\"t\".\"a\" AND \"t\".\"b\") AND \"t\".\"c\")");
    }

    #[test]
    fn eq_against_null_rewrites_to_is_null() {
        let e = col::<IntegerClass>("t", "x").eq(null());
        assert_eq!(sql(e), "\"t\".\"x\" IS NULL");
    }

    #[test]
    fn ne_against_null_rewrites_to_is_not_null() {
        let e = col::<IntegerClass>("t", "x").ne(null());
        assert_eq!(sql(e), "\"t\".\"x\" IS NOT NULL");
    }

    #[test]
    fn empty_in_list_renders_false() {
        let e = col::<IntegerClass>("t", "x").in_list(Vec::<Expr<IntegerClass>>::new());
        assert_eq!(sql(e), "FALSE");
    }

    #[test]
    fn empty_not_in_list_renders_true() {
        let e = col::<IntegerClass>("t", "x").not_in(Vec::<Expr<IntegerClass>>::new());
        assert_eq!(sql(e), "TRUE");
    }

    #[test]
    fn between_renders() {
        let e = col::<IntegerClass>("t", "x").between(lit_int(1), lit_int(10));
        let (sql, args) = e.to_tokens(Dialect::Postgres).finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "\"t\".\"x\" BETWEEN $1 AND $2");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn count_distinct_renders() {
        let e = count_distinct(col::<IntegerClass>("t", "x"));
        assert_eq!(sql(e), "COUNT(DISTINCT \"t\".\"x\")");
    }

    #[test]
    fn case_without_else() {
        let e = case::<StringClass>()
            .when(col::<BoolClass>("t", "a"), lit_str("yes"))
            .build();
        let (sql, args) = e.to_tokens(Dialect::Postgres).finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "CASE WHEN \"t\".\"a\" THEN $1 END");
        assert_eq!(args.len(), 1);
    }

    #[test]
    #[should_panic(expected = "at least one WHEN")]
    fn case_requires_a_when() {
        let _ = case::<StringClass>().build();
    }

    #[test]
    fn window_frame_without_order_by_panics() {
        let result = std::panic::catch_unwind(|| {
            row_number().over(vec![], vec![], Some(WindowFrame::rolling(3)))
        });
        assert!(result.is_err());
    }

    #[test]
    fn groups_frame_falls_back_to_rows_when_unsupported() {
        let e = row_number().over(
            vec![],
            vec![order_asc(col::<IntegerClass>("t", "x"))],
            Some(WindowFrame {
                kind: WindowFrameKind::Groups,
                start: WindowFrameBound::UnboundedPreceding,
                end: Some(WindowFrameBound::CurrentRow),
            }),
        );
        // MySQL does not support GROUPS frames; Postgres does.
        assert!(e.to_sql(Dialect::MySql).contains("ROWS"));
        assert!(e.to_sql(Dialect::Postgres).contains("GROUPS"));
    }

    #[test]
    fn concat_uses_function_on_mysql() {
        let e = lit_str("a").concat(lit_str("b"));
        assert!(e.to_sql(Dialect::Postgres).contains("||"));
        assert!(e.to_sql(Dialect::MySql).contains("CONCAT("));
    }

    #[test]
    fn raw_sql_is_emitted_verbatim() {
        let e = raw_sql("1 = 1").as_bool();
        assert_eq!(sql(e), "1 = 1");
    }
}
