//! Table and column descriptors (§3.3).
//!
//! A table descriptor owns one `Expr<T>` per column, already qualified by
//! the descriptor's current alias. `.alias(name)` produces an independent
//! deep copy whose columns are re-qualified with the new alias; the
//! original descriptor (and anything already built from it) is untouched,
//! which is what makes a self-join possible: `employee` and
//! `employee.alias("Manager")` project the same columns under two
//! different qualifiers in the same statement.
//!
//! Hand-written per-table descriptors are verbose to keep in sync with a
//! schema by hand, so the [`table!`] macro generates them from a compact
//! declaration. The generated `all_columns` projections use
//! [`crate::sql::query::qrm_projection`], so a destination type's
//! `#[derive(FromRow)]` can match them without either side repeating the
//! column list.

use crate::sql::query::{Query, SelectExpr, TableRef};

/// Shared by every generated table descriptor: the pieces a query needs to
/// reference the table without caring about its column shape.
pub trait TableDescriptor {
    /// The bare table name (never the alias).
    fn table_name() -> &'static str;

    /// The schema this table lives in, if any.
    fn schema_name() -> Option<&'static str> {
        None
    }

    /// The qualifier this instance's columns currently render under - the
    /// alias if one was set via [`table!`]'s `.alias()`, otherwise the bare
    /// table name.
    fn reference_name(&self) -> &str;

    /// A [`TableRef`] for this instance, suitable for `Query::from`/`join`.
    fn table_ref(&self) -> TableRef {
        let mut table_ref = TableRef::new(Self::table_name());
        if let Some(schema) = Self::schema_name() {
            table_ref = table_ref.with_schema(schema);
        }
        if self.reference_name() != Self::table_name() {
            table_ref = table_ref.with_alias(self.reference_name().to_string());
        }
        table_ref
    }
}

/// Declares a table descriptor: a struct with one public `Expr<T>` field per
/// column, plus `new`, `alias`, `all_columns`, `table_ref` and `select`.
///
/// ```ignore
/// table! {
///     /// The `Album` table.
///     pub struct Album in schema "chinook" {
///         album_id: IntegerClass => "AlbumId",
///         title: StringClass => "Title",
///         artist_id: IntegerClass => "ArtistId",
///     }
/// }
///
/// let album = Album::new();
/// let query = album.select(album.all_columns()).order_by(vec![OrderByExpr::asc(album.album_id.clone())]);
/// ```
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(in schema $schema:literal)? {
            $( $field:ident : $class:ty => $column:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $( pub $field: $crate::sql::expr::Expr<$class>, )*
            __alias: String,
        }

        impl $name {
            /// A fresh, unaliased descriptor qualified by the bare table name.
            pub fn new() -> Self {
                Self::with_reference_name(stringify!($name))
            }

            /// A deep copy of this descriptor whose columns are re-qualified
            /// under `name` instead of the current alias. The receiver is
            /// left untouched, so both can be projected in the same query
            /// (self-joins).
            pub fn alias(&self, name: impl Into<String>) -> Self {
                Self::with_reference_name(name)
            }

            fn with_reference_name(name: impl Into<String>) -> Self {
                let name = name.into();
                Self {
                    $( $field: $crate::sql::expr::col(name.clone(), $column), )*
                    __alias: name,
                }
            }

            /// Every column, projected with the `"<Alias>.<Column>"` alias
            /// QRM matches a `#[derive(FromRow)]` destination against.
            pub fn all_columns(&self) -> Vec<$crate::sql::query::SelectExpr> {
                vec![
                    $( $crate::sql::query::qrm_projection(&self.__alias, $column, self.$field.clone()), )*
                ]
            }

            /// `Query::new().from(self.table_ref()).select(columns)`.
            pub fn select(
                &self,
                columns: Vec<impl Into<$crate::sql::query::SelectExpr>>,
            ) -> $crate::sql::query::Query {
                $crate::sql::query::Query::new().from(self.table_ref()).select(columns)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::table::TableDescriptor for $name {
            fn table_name() -> &'static str {
                stringify!($name)
            }

            fn schema_name() -> Option<&'static str> {
                $crate::table::__schema_literal!($($schema)?)
            }

            fn reference_name(&self) -> &str {
                &self.__alias
            }
        }
    };
}

/// Implementation detail of [`table!`]: expands the optional `in schema
/// "..."` clause to `Some("...")` or `None`.
#[doc(hidden)]
#[macro_export]
macro_rules! __schema_literal {
    () => {
        None
    };
    ($schema:literal) => {
        Some($schema)
    };
}

pub use __schema_literal;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;
    use crate::sql::expr::{BoolClass, IntegerClass, StringClass};
    use crate::sql::query::OrderByExpr;

    table! {
        pub struct Album in schema "chinook" {
            album_id: IntegerClass => "AlbumId",
            title: StringClass => "Title",
            artist_id: IntegerClass => "ArtistId",
        }
    }

    table! {
        pub struct Employee {
            employee_id: IntegerClass => "EmployeeId",
            reports_to: IntegerClass => "ReportsTo",
        }
    }

    #[test]
    fn default_descriptor_qualifies_columns_by_table_name() {
        let album = Album::new();
        let (sql, _) = album
            .select(album.all_columns())
            .order_by(vec![OrderByExpr::asc(album.album_id.clone())])
            .finalize(Dialect::Postgres, false, false);
        assert_eq!(
            sql,
            "SELECT \"Album\".\"AlbumId\" AS \"Album.AlbumId\", \"Album\".\"Title\" AS \"Album.Title\", \"Album\".\"ArtistId\" AS \"Album.ArtistId\" FROM chinook.\"Album\" ORDER BY \"Album\".\"AlbumId\" ASC"
        );
    }

    #[test]
    fn alias_rewrites_projection_without_touching_the_original() {
        let employee = Employee::new();
        let manager = employee.alias("Manager");

        let condition: crate::sql::expr::Expr<BoolClass> =
            employee.reports_to.clone().eq(manager.employee_id.clone());
        let sql = condition.to_sql(Dialect::Postgres);

        assert!(sql.contains("\"Employee\".\"ReportsTo\""));
        assert!(sql.contains("\"Manager\".\"EmployeeId\""));
        assert_eq!(employee.reference_name(), "Employee");
        assert_eq!(manager.reference_name(), "Manager");
    }
}
