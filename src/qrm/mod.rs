//! Query & Result Mapper (QRM).
//!
//! Maps a flat row stream - column names of the form `"<Table>.<Column>"` -
//! onto a (possibly nested) destination value. The statement and the
//! destination type never share a schema; they agree only through this
//! naming convention (see [`crate::sql::query::qrm_projection`]).
//!
//! The folding algorithm lives here, once, generically; `#[derive(FromRow)]`
//! only has to emit flat per-field data (which columns this level owns,
//! how to build one instance, how to recurse into nested collections), not
//! the fold control flow itself.

use crate::error::{Error, Result};
use crate::value::Value;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

/// One row of a result set, columns keyed by their `"<Table>.<Column>"`
/// projection alias.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Looks up a `"<Table>.<Column>"` key, matched exactly first and
    /// falling back to a case-insensitive scan so a destination field's
    /// derived column name need not match the row's casing byte-for-byte
    /// (§4.5's "case-insensitive" field-to-column resolution).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.columns.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }
}

/// A driver-produced stream of rows, fallible per-row so a mid-stream driver
/// error surfaces without losing what was already mapped.
pub type RowStream = BoxStream<'static, Result<Row>>;

/// Converts one column's [`Value`] into a Rust field type, honoring
/// nullability (`NULL` into a non-`Option` field is a [`Error::TypeMismatch`],
/// into `Option<T>` it is `None`).
pub trait FromSqlValue: Sized {
    fn from_sql_value(column: &str, value: &Value) -> Result<Self>;
}

macro_rules! from_sql_value_scalar {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromSqlValue for $ty {
            fn from_sql_value(column: &str, value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone().into()),
                    Value::Null => Err(Error::TypeMismatch {
                        column: column.to_string(),
                        expected: $expected,
                    }),
                    _ => Err(Error::TypeMismatch {
                        column: column.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }
    };
}

from_sql_value_scalar!(bool, Bool, "bool");
from_sql_value_scalar!(String, String, "string");
from_sql_value_scalar!(Vec<u8>, Bytes, "bytes");

impl FromSqlValue for i64 {
    fn from_sql_value(column: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Null => Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: "i64",
            }),
            _ => Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: "i64",
            }),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(column: &str, value: &Value) -> Result<Self> {
        i64::from_sql_value(column, value).map(|v| v as i32)
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(column: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Null => Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: "f64",
            }),
            _ => Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: "f64",
            }),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(column: &str, value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::from_sql_value(column, value)?))
        }
    }
}

/// Implemented by hand, or generated by `#[derive(FromRow)]`, for every
/// destination type QRM can materialize.
pub trait FromRow: Sized + 'static {
    /// The table (or `#[sql(table = "...")]`/`#[sql(alias = "...")]`
    /// override) this level's columns are prefixed with.
    const TABLE: &'static str;

    /// `(column, is_primary_key)` for this level's own scalar fields, in
    /// declaration order. If no field is tagged `#[sql(primary_key)]`, every
    /// entry in this list contributes to the fingerprint; otherwise only
    /// the tagged ones do.
    fn scalar_columns() -> &'static [(&'static str, bool)];

    /// Build one instance from this level's own scalar columns. Nested
    /// `Vec<Child>`/`Option<Box<Child>>` fields start empty/`None`; they are
    /// populated by [`FromRow::fold_children`].
    fn build(row: &Row) -> Result<Self>;

    /// Fold `row` into this entry's nested child collections. A no-op for
    /// leaf types with no nested fields.
    fn fold_children(&mut self, row: &Row, state: &mut FoldState) -> Result<()>;
}

/// The fingerprint of one level for one row: the stringified value of each
/// contributing column, in declaration order. `None` at any position means
/// that column was `NULL`. The whole fingerprint is `None` when every
/// contributing column is `NULL` - the level is "absent" for this row.
pub fn fingerprint<T: FromRow>(row: &Row) -> Option<Vec<Option<String>>> {
    let columns = T::scalar_columns();
    let tagged: Vec<_> = columns.iter().filter(|(_, pk)| *pk).collect();
    let active: Vec<&(&'static str, bool)> = if tagged.is_empty() {
        columns.iter().collect()
    } else {
        tagged
    };

    let mut any_present = false;
    let mut parts = Vec::with_capacity(active.len());
    for (name, _) in active {
        let key = format!("{}.{}", T::TABLE, name);
        let part = row.get(&key).and_then(Value::fingerprint_part);
        if part.is_some() {
            any_present = true;
        }
        parts.push(part);
    }
    if any_present {
        Some(parts)
    } else {
        None
    }
}

/// Per-entry, per-nested-field scratch state threaded through
/// [`FromRow::fold_children`]. Destination structs stay plain Rust types
/// (no hidden fields); this carries the fold bookkeeping (the last
/// fingerprint seen for each nested collection) that would otherwise have
/// nowhere to live.
#[derive(Default)]
pub struct FoldState(HashMap<&'static str, Box<dyn Any + Send>>);

impl FoldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor for a `Vec<T>` nested field named `field`.
    pub fn many_cursor<T: FromRow>(&mut self, field: &'static str) -> &mut ChildCursor<T> {
        self.0
            .entry(field)
            .or_insert_with(|| Box::new(ChildCursor::<T>::new()))
            .downcast_mut::<ChildCursor<T>>()
            .expect("FoldState: field type changed between calls")
    }

    /// The cursor for an `Option<Box<T>>` nested field named `field`.
    pub fn one_cursor<T: FromRow>(&mut self, field: &'static str) -> &mut OptionCursor<T> {
        self.0
            .entry(field)
            .or_insert_with(|| Box::new(OptionCursor::<T>::new()))
            .downcast_mut::<OptionCursor<T>>()
            .expect("FoldState: field type changed between calls")
    }
}

/// Folds rows into a `Vec<T>` nested collection: reuses the last entry when
/// the incoming row's fingerprint matches it, appends a new entry otherwise,
/// and does nothing when the level is absent (all-NULL) for this row.
pub struct ChildCursor<T> {
    current_fingerprint: Option<Vec<Option<String>>>,
    current_state: FoldState,
    _marker: PhantomData<T>,
}

impl<T: FromRow> ChildCursor<T> {
    pub fn new() -> Self {
        Self {
            current_fingerprint: None,
            current_state: FoldState::new(),
            _marker: PhantomData,
        }
    }

    pub fn ingest(&mut self, target: &mut Vec<T>, row: &Row) -> Result<()> {
        let Some(fp) = fingerprint::<T>(row) else {
            return Ok(());
        };
        if self.current_fingerprint.as_ref() == Some(&fp) {
            if let Some(last) = target.last_mut() {
                last.fold_children(row, &mut self.current_state)?;
            }
        } else {
            let mut item = T::build(row)?;
            self.current_state = FoldState::new();
            item.fold_children(row, &mut self.current_state)?;
            target.push(item);
            self.current_fingerprint = Some(fp);
        }
        Ok(())
    }
}

impl<T: FromRow> Default for ChildCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds rows into an `Option<Box<T>>` nested singleton: built once, on the
/// first row where the level is present; later rows fold into it but never
/// replace it.
pub struct OptionCursor<T> {
    state: FoldState,
    _marker: PhantomData<T>,
}

impl<T: FromRow> OptionCursor<T> {
    pub fn new() -> Self {
        Self {
            state: FoldState::new(),
            _marker: PhantomData,
        }
    }

    pub fn ingest(&mut self, slot: &mut Option<Box<T>>, row: &Row) -> Result<()> {
        if fingerprint::<T>(row).is_none() {
            return Ok(());
        }
        match slot {
            Some(existing) => existing.fold_children(row, &mut self.state)?,
            None => {
                let mut item = T::build(row)?;
                item.fold_children(row, &mut self.state)?;
                *slot = Some(Box::new(item));
            }
        }
        Ok(())
    }
}

impl<T: FromRow> Default for OptionCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level accumulator driving [`ChildCursor`] over an entire row stream.
struct RowMapper<T: FromRow> {
    items: Vec<T>,
    cursor: ChildCursor<T>,
}

impl<T: FromRow> RowMapper<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: ChildCursor::new(),
        }
    }

    fn ingest(&mut self, row: &Row) -> Result<()> {
        self.cursor.ingest(&mut self.items, row)
    }
}

/// Maps a row stream onto `Vec<T>`, in row order, folding nested collections
/// as described in `T`'s [`FromRow`] impl.
pub async fn map_many<T: FromRow>(mut rows: RowStream) -> Result<Vec<T>> {
    let mut mapper = RowMapper::<T>::new();
    while let Some(row) = rows.next().await {
        mapper.ingest(&row?)?;
    }
    Ok(mapper.items)
}

/// Maps a row stream onto a single `T`. Fails with [`Error::NoRows`] if the
/// stream is empty; rows after the first complete logical entity are
/// ignored for the top-level record but still fold into its own nested
/// collections.
pub async fn map_one<T: FromRow>(rows: RowStream) -> Result<T> {
    let mut items = map_many::<T>(rows).await?;
    if items.is_empty() {
        return Err(Error::NoRows);
    }
    Ok(items.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Album {
        album_id: i64,
        title: String,
    }

    impl FromRow for Album {
        const TABLE: &'static str = "Album";

        fn scalar_columns() -> &'static [(&'static str, bool)] {
            &[("AlbumId", true), ("Title", false)]
        }

        fn build(row: &Row) -> Result<Self> {
            Ok(Self {
                album_id: i64::from_sql_value(
                    "Album.AlbumId",
                    row.get("Album.AlbumId").unwrap_or(&Value::Null),
                )?,
                title: String::from_sql_value(
                    "Album.Title",
                    row.get("Album.Title").unwrap_or(&Value::Null),
                )?,
            })
        }

        fn fold_children(&mut self, _row: &Row, _state: &mut FoldState) -> Result<()> {
            Ok(())
        }
    }

    struct Artist {
        artist_id: i64,
        name: String,
        albums: Vec<Album>,
    }

    impl FromRow for Artist {
        const TABLE: &'static str = "Artist";

        fn scalar_columns() -> &'static [(&'static str, bool)] {
            &[("ArtistId", true), ("Name", false)]
        }

        fn build(row: &Row) -> Result<Self> {
            Ok(Self {
                artist_id: i64::from_sql_value(
                    "Artist.ArtistId",
                    row.get("Artist.ArtistId").unwrap_or(&Value::Null),
                )?,
                name: String::from_sql_value(
                    "Artist.Name",
                    row.get("Artist.Name").unwrap_or(&Value::Null),
                )?,
                albums: Vec::new(),
            })
        }

        fn fold_children(&mut self, row: &Row, state: &mut FoldState) -> Result<()> {
            state.many_cursor::<Album>("albums").ingest(&mut self.albums, row)
        }
    }

    fn row(artist_id: i64, name: &str, album: Option<(i64, &str)>) -> Row {
        let mut columns = vec![
            ("Artist.ArtistId".to_string(), Value::Int(artist_id)),
            ("Artist.Name".to_string(), Value::String(name.to_string())),
        ];
        match album {
            Some((id, title)) => {
                columns.push(("Album.AlbumId".to_string(), Value::Int(id)));
                columns.push(("Album.Title".to_string(), Value::String(title.to_string())));
            }
            None => {
                columns.push(("Album.AlbumId".to_string(), Value::Null));
                columns.push(("Album.Title".to_string(), Value::Null));
            }
        }
        Row::new(columns)
    }

    fn push_rows(mapper: &mut RowMapper<Artist>, rows: &[Row]) {
        for r in rows {
            mapper.ingest(r).unwrap();
        }
    }

    #[test]
    fn left_join_with_no_children_yields_empty_collection() {
        let rows = vec![row(1, "Adams", None)];
        let mut mapper = RowMapper::<Artist>::new();
        push_rows(&mut mapper, &rows);
        assert_eq!(mapper.items.len(), 1);
        assert!(mapper.items[0].albums.is_empty());
    }

    #[test]
    fn repeated_parent_rows_fold_into_one_parent_with_many_children() {
        let rows = vec![
            row(1, "Adams", None),
            row(2, "Beatles", Some((10, "Abbey Road"))),
            row(2, "Beatles", Some((11, "Let It Be"))),
        ];
        let mut mapper = RowMapper::<Artist>::new();
        push_rows(&mut mapper, &rows);
        assert_eq!(mapper.items.len(), 2);
        assert!(mapper.items[0].albums.is_empty());
        assert_eq!(mapper.items[1].albums.len(), 2);
        assert_eq!(mapper.items[1].albums[0].title, "Abbey Road");
        assert_eq!(mapper.items[1].albums[1].title, "Let It Be");
    }

    #[test]
    fn identical_fingerprints_at_a_level_collapse_to_one_entry() {
        let rows = vec![row(1, "Adams", None), row(1, "Adams", None)];
        let mut mapper = RowMapper::<Artist>::new();
        push_rows(&mut mapper, &rows);
        assert_eq!(mapper.items.len(), 1);
    }

    #[tokio::test]
    async fn map_one_on_empty_stream_fails_with_no_rows() {
        let rows: RowStream = Box::pin(futures::stream::empty());
        let err = map_one::<Artist>(rows).await.unwrap_err();
        assert!(matches!(err, Error::NoRows));
    }

    #[tokio::test]
    async fn map_many_on_empty_stream_yields_empty_vec() {
        let rows: RowStream = Box::pin(futures::stream::empty());
        let items = map_many::<Artist>(rows).await.unwrap();
        assert!(items.is_empty());
    }
}
