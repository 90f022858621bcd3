use ::capture::database::{CaptureFilter, DatabaseError, Result};
use chrono::{DateTime, Utc};
use model::{
    capture::{CaptureRecord, StationSummary},
    geo_point::GeoPoint,
    station::Station,
    WithId,
};
use sqlx::{Executor, Sqlite};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{
    capture::{CaptureRow, PointRow},
    station::StationSummaryRow,
};

use super::convert_error;

pub async fn points_for_station<'c, E>(
    executor: E,
    station: &Id<Station>,
) -> Result<Vec<GeoPoint>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            latitude, longitude
        FROM
            captures
        WHERE station_id = ?1;
        ",
    )
    .bind(station.raw_ref::<str>())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: PointRow| GeoPoint::from(row))
    .collect::<Vec<_>>()
    .let_owned(Ok)
}

pub async fn insert<'c, E>(
    executor: E,
    capture: CaptureRecord,
) -> Result<WithId<CaptureRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO captures(
            station_id,
            latitude,
            longitude,
            accuracy_meters,
            captured_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, station_id, latitude, longitude, accuracy_meters, captured_at;
        ",
    )
    .bind(capture.station_id.raw())
    .bind(capture.point.latitude)
    .bind(capture.point.longitude)
    .bind(capture.accuracy_meters)
    .bind(capture.captured_at)
    // run to completion so the row is committed before the connection is
    // handed back to the pool
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .next()
    .map(|row: CaptureRow| row.to_model())
    .ok_or(DatabaseError::NotFound)
}

pub async fn get_filtered<'c, E>(
    executor: E,
    filter: &CaptureFilter,
) -> Result<Vec<WithId<CaptureRecord>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, station_id, latitude, longitude, accuracy_meters, captured_at
        FROM
            captures
        WHERE
            (?1 IS NULL OR station_id = ?1)
            AND (?2 IS NULL OR julianday(captured_at) >= julianday(?2))
        ORDER BY julianday(captured_at) DESC, id DESC;
        ",
    )
    .bind(filter.station.as_ref().map(|id| id.raw()))
    .bind(filter.since)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: CaptureRow| row.to_model())
    .collect::<Vec<_>>()
    .let_owned(Ok)
}

pub async fn count<'c, E>(executor: E, since: Option<DateTime<Utc>>) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(
        "
        SELECT
            COUNT(*)
        FROM
            captures
        WHERE ?1 IS NULL OR julianday(captured_at) >= julianday(?1);
        ",
    )
    .bind(since)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}

/// Capture counts of every station, including those without captures, busiest
/// first.
pub async fn per_station<'c, E>(executor: E) -> Result<Vec<StationSummary>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            stations.id AS id,
            stations.name AS name,
            COUNT(captures.id) AS capture_count,
            MAX(captures.captured_at) AS last_captured_at
        FROM
            stations
            LEFT JOIN captures ON captures.station_id = stations.id
        GROUP BY stations.id, stations.name
        ORDER BY capture_count DESC, stations.name ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: StationSummaryRow| StationSummary {
        station_id: Id::new(row.id),
        name: row.name,
        capture_count: row.capture_count,
        last_captured_at: row.last_captured_at,
    })
    .collect::<Vec<_>>()
    .let_owned(Ok)
}
