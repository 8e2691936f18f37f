//! End-to-end scenarios from the design's testable-properties section:
//! a table descriptor, a join, a `#[derive(FromRow)]` destination, and the
//! QRM fold running over a synthetic row stream together.

use sqlcraft::prelude::*;
use sqlcraft::{table, FromRow};

table! {
    pub struct Artist {
        artist_id: IntegerClass => "ArtistId",
        name: StringClass => "Name",
    }
}

table! {
    pub struct Album {
        album_id: IntegerClass => "AlbumId",
        title: StringClass => "Title",
        artist_id: IntegerClass => "ArtistId",
    }
}

#[derive(Debug, FromRow)]
#[sql(table = "Album")]
struct AlbumRow {
    #[sql(primary_key)]
    album_id: i64,
    title: String,
}

#[derive(Debug, FromRow)]
#[sql(table = "Artist")]
struct ArtistRow {
    #[sql(primary_key)]
    artist_id: i64,
    name: String,
    albums: Vec<AlbumRow>,
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

fn stream(rows: Vec<Row>) -> RowStream {
    Box::pin(futures::stream::iter(rows.into_iter().map(Ok)))
}

#[test]
fn left_join_renders_the_expected_select_and_qrm_projection_aliases() {
    let artist = Artist::new();
    let album = Album::new();

    let mut columns = artist.all_columns();
    columns.extend(album.all_columns());

    let query = artist
        .select(columns)
        .left_join(album.table_ref(), artist.artist_id.clone().eq(album.artist_id.clone()))
        .order_by(vec![OrderByExpr::asc(artist.artist_id.clone())]);

    let (sql, args) = query.finalize(Dialect::Postgres, false, false);
    assert!(sql.contains("LEFT JOIN \"Album\" ON (\"Artist\".\"ArtistId\" = \"Album\".\"ArtistId\")"));
    assert!(sql.contains("\"Artist\".\"ArtistId\" AS \"Artist.ArtistId\""));
    assert!(sql.contains("\"Album\".\"AlbumId\" AS \"Album.AlbumId\""));
    assert!(args.is_empty());
}

#[tokio::test]
async fn derived_from_row_folds_albums_under_their_artist_in_row_order() {
    let rows = vec![
        row(1, "Adams", None),
        row(2, "Beatles", Some((10, "Abbey Road"))),
        row(2, "Beatles", Some((11, "Let It Be"))),
    ];

    let artists: Vec<ArtistRow> = sqlcraft::qrm::map_many(stream(rows)).await.unwrap();

    assert_eq!(artists.len(), 2);
    assert!(artists[0].albums.is_empty());
    assert_eq!(artists[1].albums.len(), 2);
    assert_eq!(artists[1].albums[0].title, "Abbey Road");
    assert_eq!(artists[1].albums[1].title, "Let It Be");
}

#[tokio::test]
async fn single_record_destination_fails_with_no_rows_on_an_empty_stream() {
    let err = sqlcraft::qrm::map_one::<ArtistRow>(stream(vec![])).await.unwrap_err();
    assert!(matches!(err, sqlcraft::Error::NoRows));
}

#[test]
fn self_join_alias_carries_through_to_projection() {
    table! {
        pub struct Employee {
            employee_id: IntegerClass => "EmployeeId",
            reports_to: IntegerClass => "ReportsTo",
        }
    }

    let employee = Employee::new();
    let manager = employee.alias("Manager");

    let mut columns = employee.all_columns();
    columns.push(sqlcraft::sql::query::qrm_projection(
        "Manager",
        "EmployeeId",
        manager.employee_id.clone(),
    ));

    let query = employee
        .select(columns)
        .filter(employee.reports_to.clone().eq(manager.employee_id.clone()));

    let (sql, _) = query.finalize(Dialect::Postgres, false, false);
    assert!(sql.contains("\"Manager.EmployeeId\""));
    assert!(!sql.contains("\"Employee.EmployeeId\" AS \"Manager.EmployeeId\""));
}

#[test]
fn null_comparison_rewrites_to_is_null() {
    let album = Album::new();
    let condition = album.title.clone().eq(null::<StringClass>());
    assert_eq!(condition.to_sql(Dialect::Postgres), "\"Album\".\"Title\" IS NULL");
}
