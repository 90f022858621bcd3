use ::capture::database::{DatabaseError, Result};
use model::{station::Station, WithId};
use sqlx::{Executor, Sqlite};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::station::StationRow;

use super::convert_error;

pub async fn insert<'c, E>(
    executor: E,
    station: WithId<Station>,
) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO stations(
            id,
            name,
            owner_name,
            phone,
            station_type,
            created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, name, owner_name, phone, station_type, created_at;
        ",
    )
    .bind(station.id.raw())
    .bind(station.content.name)
    .bind(station.content.owner_name)
    .bind(station.content.phone)
    .bind(station.content.station_type)
    .bind(station.content.created_at)
    // run to completion so the row is committed before the connection is
    // handed back to the pool
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .next()
    .map(|row: StationRow| row.to_model())
    .ok_or(DatabaseError::NotFound)
}

pub async fn get<'c, E>(executor: E, id: &Id<Station>) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, owner_name, phone, station_type, created_at
        FROM
            stations
        WHERE id = ?1;
        ",
    )
    .bind(id.raw_ref::<str>())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: StationRow| row.to_model())
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Station>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, owner_name, phone, station_type, created_at
        FROM
            stations
        ORDER BY julianday(created_at) DESC, id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: StationRow| row.to_model())
    .collect::<Vec<_>>()
    .let_owned(Ok)
}

pub async fn exists<'c, E>(executor: E, id: &Id<Station>) -> Result<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stations WHERE id = ?1);")
        .bind(id.raw_ref::<str>())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}

pub async fn count<'c, E>(executor: E) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM stations;")
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}
