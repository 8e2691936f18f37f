//! SQL Tokens - the atomic units of SQL output, and the `TokenStream`
//! accumulator that renders them into parameterized SQL text plus an
//! argument vector.
//!
//! Tokens are dialect-agnostic representations that serialize to
//! dialect-specific strings. A `Token::Param` is special: it does not
//! serialize to static text by itself, since its rendering depends on
//! whether the enclosing `finalize` call is in debug mode (inline literal)
//! or normal mode (placeholder + push onto the argument vector).

use super::dialect::{Dialect, SqlDialect};
use crate::value::{hex_encode, Value};

/// SQL Token - every possible element in a SQL statement.
///
/// Adding a new variant here will cause compile errors everywhere it needs
/// to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    Distinct,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    Nulls,
    First,
    Last,
    Limit,
    Offset,
    With,
    Recursive,
    Union,
    Intersect,
    Except,
    All,

    In,
    Between,
    Like,
    Ilike,
    Escape,
    Is,
    Null,
    True,
    False,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Window function keywords
    Over,
    PartitionBy,
    Rows,
    Range,
    Groups,
    Unbounded,
    Preceding,
    Following,
    CurrentRow,
    Filter,

    // DML keywords
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Using,
    Returning,
    Conflict,
    Do,
    Nothing,
    OnConflict,

    // Punctuation
    Comma,
    Dot,
    LParen,
    RParen,
    Star,

    // Operators
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
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
    Tilde,
    SimilarTo,

    // Whitespace / formatting
    Space,
    Newline,
    Indent(usize),

    // Dynamic content
    Ident(String),
    QualifiedIdent { schema: Option<String>, name: String },
    FunctionName(String),
    /// A bare, already-formatted literal that needs no quoting (numeric
    /// LIMIT/OFFSET counts, frame bounds). Not a parameter: never counted
    /// against the argument vector.
    RawLiteral(String),
    /// A value bound as a placeholder in normal mode, or inlined as a
    /// dialect literal in debug mode. The only stateful token.
    Param(Value),

    /// Escape hatch for text the builder has no structured representation
    /// for. Callers are responsible for correctness and for not admitting
    /// unsanitized input here: this text is emitted verbatim, unescaped.
    Raw(String),
}

impl Token {
    /// Render a token that is not `Param` into dialect-specific text.
    /// Callers must special-case `Param` themselves (see
    /// `TokenStream::finalize`), which is why this method does not cover it.
    fn serialize(&self, dialect: Dialect) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::Left => "LEFT".into(),
            Token::Right => "RIGHT".into(),
            Token::Full => "FULL".into(),
            Token::Outer => "OUTER".into(),
            Token::Cross => "CROSS".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Having => "HAVING".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Nulls => "NULLS".into(),
            Token::First => "FIRST".into(),
            Token::Last => "LAST".into(),
            Token::Limit => "LIMIT".into(),
            Token::Offset => "OFFSET".into(),
            Token::With => "WITH".into(),
            Token::Recursive => "RECURSIVE".into(),
            Token::Union => "UNION".into(),
            Token::Intersect => "INTERSECT".into(),
            Token::Except => "EXCEPT".into(),
            Token::All => "ALL".into(),
            Token::In => "IN".into(),
            Token::Between => "BETWEEN".into(),
            Token::Like => "LIKE".into(),
            Token::Ilike => "ILIKE".into(),
            Token::Escape => "ESCAPE".into(),
            Token::Is => "IS".into(),
            Token::Null => "NULL".into(),
            Token::True => "TRUE".into(),
            Token::False => "FALSE".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),
            Token::Cast => "CAST".into(),
            Token::Over => "OVER".into(),
            Token::PartitionBy => "PARTITION BY".into(),
            Token::Rows => "ROWS".into(),
            Token::Range => "RANGE".into(),
            Token::Groups => "GROUPS".into(),
            Token::Unbounded => "UNBOUNDED".into(),
            Token::Preceding => "PRECEDING".into(),
            Token::Following => "FOLLOWING".into(),
            Token::CurrentRow => "CURRENT ROW".into(),
            Token::Filter => "FILTER".into(),
            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Values => "VALUES".into(),
            Token::Update => "UPDATE".into(),
            Token::Set => "SET".into(),
            Token::Delete => "DELETE".into(),
            Token::Using => "USING".into(),
            Token::Returning => "RETURNING".into(),
            Token::Conflict => "CONFLICT".into(),
            Token::Do => "DO".into(),
            Token::Nothing => "NOTHING".into(),
            Token::OnConflict => "ON CONFLICT".into(),
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Star => "*".into(),
            Token::Eq => "=".into(),
            Token::NotEq => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Mul => "*".into(),
            Token::Div => "/".into(),
            Token::Mod => "%".into(),
            Token::Concat => dialect.concat_operator().into(),
            Token::BitAnd => "&".into(),
            Token::BitOr => "|".into(),
            Token::BitXor => dialect.bitwise_xor_operator().into(),
            Token::ShiftLeft => "<<".into(),
            Token::ShiftRight => ">>".into(),
            Token::Tilde => dialect.regex_operator().into(),
            Token::SimilarTo => "SIMILAR TO".into(),
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "     ".repeat(*n),
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::QualifiedIdent { schema, name } => match schema {
                Some(schema) => format!(
                    "{}.{}",
                    dialect.quote_identifier(schema),
                    dialect.quote_identifier(name)
                ),
                None => dialect.quote_identifier(name),
            },
            Token::FunctionName(name) => dialect
                .remap_function(name)
                .unwrap_or(name.as_str())
                .to_uppercase(),
            Token::RawLiteral(text) => text.clone(),
            Token::Param(_) => unreachable!("Param must be handled by TokenStream::finalize"),
            Token::Raw(text) => text.clone(),
        }
    }
}

/// An ordered sequence of tokens. Built up by expressions and statements,
/// consumed exactly once by `finalize`.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, level: usize) -> &mut Self {
        self.push(Token::Indent(level))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }

    /// Render the accumulated tokens for `dialect`.
    ///
    /// `debug`: inline `Param` values as dialect literals instead of
    /// placeholders (no argument vector is meaningful in this mode, but one
    /// is still returned, empty, for a uniform signature).
    ///
    /// `pretty`: emit newlines and five-space indentation units; compact
    /// mode (the default) collapses clause boundaries to single spaces.
    pub fn finalize(&self, dialect: Dialect, debug: bool, pretty: bool) -> (String, Vec<Value>) {
        let mut out = String::new();
        let mut args = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Param(value) => {
                    if debug {
                        out.push_str(&render_debug_literal(value, dialect));
                    } else {
                        args.push(value.clone());
                        out.push_str(&dialect.placeholder(args.len()));
                    }
                }
                Token::Newline => {
                    if pretty {
                        out.push('\n');
                    } else {
                        out.push(' ');
                    }
                }
                Token::Indent(n) => {
                    if pretty {
                        out.push_str(&"     ".repeat(*n));
                    }
                }
                other => out.push_str(&other.serialize(dialect)),
            }
        }

        (out, args)
    }

    /// Render in compact mode with placeholders, discarding the argument
    /// vector. Used where only the SQL text matters (tests, `Display`).
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.finalize(dialect, false, false).0
    }
}

fn render_debug_literal(value: &Value, dialect: Dialect) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Bool(b) => dialect.format_bool(*b).into(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            let mut buf = ryu::Buffer::new();
            buf.format_finite(*f).to_string()
        }
        Value::String(s) => dialect.quote_string(s),
        Value::Bytes(b) => match dialect {
            Dialect::MySql => format!("0x{}", hex_encode(b)),
            Dialect::Postgres => format!("E'\\\\x{}'", hex_encode(b)),
        },
        Value::Timestamp(t) => match dialect {
            Dialect::Postgres => format!("{}::timestamp", dialect.quote_string(t)),
            Dialect::MySql => dialect.quote_string(t),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_in_normal_mode_produces_placeholder_and_argument() {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident("x".into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Param(Value::Int(1)));

        let (sql, args) = ts.finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "\"x\" = $1");
        assert_eq!(args, vec![Value::Int(1)]);
    }

    #[test]
    fn mysql_placeholder_is_bare_question_mark() {
        let mut ts = TokenStream::new();
        ts.push(Token::Param(Value::Int(7)));
        let (sql, args) = ts.finalize(Dialect::MySql, false, false);
        assert_eq!(sql, "?");
        assert_eq!(args, vec![Value::Int(7)]);
    }

    #[test]
    fn debug_mode_inlines_and_yields_no_arguments() {
        let mut ts = TokenStream::new();
        ts.push(Token::Param(Value::String("it's".into())));
        let (sql, args) = ts.finalize(Dialect::Postgres, true, false);
        assert_eq!(sql, "'it''s'");
        assert!(args.is_empty());
    }

    #[test]
    fn placeholder_indices_are_left_to_right() {
        let mut ts = TokenStream::new();
        ts.push(Token::Param(Value::Int(10)))
            .comma()
            .push(Token::Param(Value::Int(20)));
        let (sql, args) = ts.finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "$1,$2");
        assert_eq!(args, vec![Value::Int(10), Value::Int(20)]);
    }

    #[test]
    fn pretty_mode_renders_newlines_and_five_space_indent() {
        let mut ts = TokenStream::new();
        ts.push(Token::Select).newline().indent(1).push(Token::Star);
        let (sql, _) = ts.finalize(Dialect::Postgres, false, true);
        assert_eq!(sql, "SELECT\n     *");
    }

    #[test]
    fn compact_mode_collapses_newline_indent_pair_to_one_space() {
        let mut ts = TokenStream::new();
        ts.push(Token::Select).newline().indent(1).push(Token::Star);
        let (sql, _) = ts.finalize(Dialect::Postgres, false, false);
        assert_eq!(sql, "SELECT *");
    }
}
