//! SQL-level data types used as `CAST` targets.
//!
//! This is distinct from the expression algebra's type classes (`Bool`,
//! `Integer`, …), which gate which operators an `Expr<T>` exposes. A
//! `SqlDataType` names the concrete SQL type a dialect emits for `CAST(expr
//! AS ..)`; it carries no operator semantics of its own.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDataType {
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal(u8, u8),
    Text,
    Varchar(u16),
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Bytes,
    Json,
    Uuid,
}

impl SqlDataType {
    /// Render this type the way PostgreSQL-family dialects spell it.
    pub fn emit_postgres(&self) -> String {
        match self {
            SqlDataType::Bool => "BOOLEAN".into(),
            SqlDataType::Int16 => "SMALLINT".into(),
            SqlDataType::Int32 => "INTEGER".into(),
            SqlDataType::Int64 => "BIGINT".into(),
            SqlDataType::Float32 => "REAL".into(),
            SqlDataType::Float64 => "DOUBLE PRECISION".into(),
            SqlDataType::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
            SqlDataType::Text => "TEXT".into(),
            SqlDataType::Varchar(n) => format!("VARCHAR({n})"),
            SqlDataType::Date => "DATE".into(),
            SqlDataType::Time => "TIME".into(),
            SqlDataType::Timestamp => "TIMESTAMP".into(),
            SqlDataType::TimestampTz => "TIMESTAMPTZ".into(),
            SqlDataType::Bytes => "BYTEA".into(),
            SqlDataType::Json => "JSONB".into(),
            SqlDataType::Uuid => "UUID".into(),
        }
    }

    /// Render this type the way MySQL-family dialects spell it.
    pub fn emit_mysql(&self) -> String {
        match self {
            SqlDataType::Bool => "SIGNED".into(),
            SqlDataType::Int16 => "SIGNED".into(),
            SqlDataType::Int32 => "SIGNED".into(),
            SqlDataType::Int64 => "SIGNED".into(),
            SqlDataType::Float32 => "FLOAT".into(),
            SqlDataType::Float64 => "DOUBLE".into(),
            SqlDataType::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
            SqlDataType::Text => "CHAR".into(),
            SqlDataType::Varchar(n) => format!("CHAR({n})"),
            SqlDataType::Date => "DATE".into(),
            SqlDataType::Time => "TIME".into(),
            SqlDataType::Timestamp => "DATETIME".into(),
            SqlDataType::TimestampTz => "DATETIME".into(),
            SqlDataType::Bytes => "BINARY".into(),
            SqlDataType::Json => "JSON".into(),
            SqlDataType::Uuid => "CHAR(36)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_keeps_precision_and_scale() {
        assert_eq!(SqlDataType::Decimal(18, 2).emit_postgres(), "DECIMAL(18, 2)");
        assert_eq!(SqlDataType::Decimal(18, 2).emit_mysql(), "DECIMAL(18, 2)");
    }

    #[test]
    fn mysql_has_no_native_bigint_cast_target() {
        // MySQL's CAST only accepts a handful of target types; integers all
        // cast to SIGNED regardless of width.
        assert_eq!(SqlDataType::Int64.emit_mysql(), "SIGNED");
    }
}
