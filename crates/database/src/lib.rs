use std::{env, error::Error, str::FromStr, time::Duration};

use async_trait::async_trait;
use capture::database::{
    CaptureFilter, CaptureRepo, Database, DatabaseAutocommit, DatabaseOperations,
    DatabaseTransaction, StationRepo,
};
use chrono::{DateTime, Utc};
use model::{
    capture::{CaptureRecord, CaptureSummary},
    geo_point::GeoPoint,
    station::Station,
    WithId,
};
use queries::convert_error;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Executor, Sqlite, SqlitePool, Transaction,
};
use utility::id::Id;

pub mod data_model;
pub mod queries;

const DEFAULT_DATABASE_PATH: &str = "stations.db";

pub enum DatabaseConnectionInfo {
    File { path: String },
    InMemory,
}

impl DatabaseConnectionInfo {
    /// Reads `DATABASE_PATH`, falling back to `stations.db` in the working
    /// directory.
    pub fn from_env() -> Self {
        let path = env::var("DATABASE_PATH").unwrap_or_else(|_| {
            log::info!(
                "DATABASE_PATH not set, using default: {}",
                DEFAULT_DATABASE_PATH
            );
            DEFAULT_DATABASE_PATH.to_owned()
        });
        Self::File { path }
    }

    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub(self) fn pool_options(&self) -> SqlitePoolOptions {
        match self {
            Self::File { .. } => SqlitePoolOptions::new().max_connections(8),
            // every connection to `:memory:` opens a database of its own, so
            // the single connection must never be closed
            Self::InMemory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        }
    }

    pub(self) fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = match self {
            Self::File { path } => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                // writers queue behind an open capture transaction
                .busy_timeout(Duration::from_secs(5)),
            Self::InMemory => SqliteConnectOptions::from_str("sqlite::memory:")?,
        };
        Ok(options.foreign_keys(true))
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

pub struct SqliteDatabaseTransaction<'a> {
    tx: Transaction<'a, Sqlite>,
}

#[async_trait]
impl<'a> DatabaseTransaction for SqliteDatabaseTransaction<'a> {
    async fn commit(self) -> capture::database::Result<()> {
        self.tx.commit().await.map_err(convert_error)
    }
}

pub struct SqliteDatabaseAutocommit {
    pool: SqlitePool,
}

impl DatabaseAutocommit for SqliteDatabaseAutocommit {}

impl SqliteDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, Box<dyn Error>> {
        let pool = database_connection_info
            .pool_options()
            .connect_with(database_connection_info.connect_options()?)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { connection: pool })
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    type Transaction = SqliteDatabaseTransaction<'static>;
    type Autocommit = SqliteDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        SqliteDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }

    /// Opens a transaction that already holds the write lock.
    ///
    /// A deferred SQLite transaction that reads first cannot upgrade to a
    /// writer once another connection committed in between
    /// (`SQLITE_BUSY_SNAPSHOT`). The empty update claims the lock right away,
    /// like `BEGIN IMMEDIATE`, so other writers wait for the commit instead.
    async fn transaction(&self) -> capture::database::Result<Self::Transaction> {
        let mut tx: Transaction<'static, Sqlite> =
            self.connection.begin().await.map_err(convert_error)?;
        sqlx::query("UPDATE stations SET id = id WHERE 0;")
            .execute(&mut *tx)
            .await
            .map_err(convert_error)?;

        Ok(SqliteDatabaseTransaction { tx })
    }
}

async fn summary<'c, E>(
    executor: E,
    since: DateTime<Utc>,
) -> capture::database::Result<CaptureSummary>
where
    E: Executor<'c, Database = Sqlite> + Copy,
{
    Ok(CaptureSummary {
        total_stations: queries::station::count(executor).await?,
        total_captures: queries::capture::count(executor, None).await?,
        since,
        captures_since: queries::capture::count(executor, Some(since)).await?,
        stations: queries::capture::per_station(executor).await?,
    })
}

#[async_trait]
impl StationRepo for SqliteDatabaseAutocommit {
    async fn insert_station(
        &mut self,
        station: WithId<Station>,
    ) -> capture::database::Result<WithId<Station>> {
        queries::station::insert(&self.pool, station).await
    }

    async fn get_station(
        &mut self,
        id: &Id<Station>,
    ) -> capture::database::Result<WithId<Station>> {
        queries::station::get(&self.pool, id).await
    }

    async fn get_stations(&mut self) -> capture::database::Result<Vec<WithId<Station>>> {
        queries::station::get_all(&self.pool).await
    }

    async fn station_exists(&mut self, id: &Id<Station>) -> capture::database::Result<bool> {
        queries::station::exists(&self.pool, id).await
    }
}

#[async_trait]
impl CaptureRepo for SqliteDatabaseAutocommit {
    async fn points_for_station(
        &mut self,
        station: &Id<Station>,
    ) -> capture::database::Result<Vec<GeoPoint>> {
        queries::capture::points_for_station(&self.pool, station).await
    }

    async fn insert_capture(
        &mut self,
        capture: CaptureRecord,
    ) -> capture::database::Result<WithId<CaptureRecord>> {
        queries::capture::insert(&self.pool, capture).await
    }

    async fn get_captures(
        &mut self,
        filter: &CaptureFilter,
    ) -> capture::database::Result<Vec<WithId<CaptureRecord>>> {
        queries::capture::get_filtered(&self.pool, filter).await
    }

    async fn capture_summary(
        &mut self,
        since: DateTime<Utc>,
    ) -> capture::database::Result<CaptureSummary> {
        summary(&self.pool, since).await
    }
}

impl DatabaseOperations for SqliteDatabaseAutocommit {}

#[async_trait]
impl<'a> StationRepo for SqliteDatabaseTransaction<'a> {
    async fn insert_station(
        &mut self,
        station: WithId<Station>,
    ) -> capture::database::Result<WithId<Station>> {
        queries::station::insert(&mut *self.tx, station).await
    }

    async fn get_station(
        &mut self,
        id: &Id<Station>,
    ) -> capture::database::Result<WithId<Station>> {
        queries::station::get(&mut *self.tx, id).await
    }

    async fn get_stations(&mut self) -> capture::database::Result<Vec<WithId<Station>>> {
        queries::station::get_all(&mut *self.tx).await
    }

    async fn station_exists(&mut self, id: &Id<Station>) -> capture::database::Result<bool> {
        queries::station::exists(&mut *self.tx, id).await
    }
}

#[async_trait]
impl<'a> CaptureRepo for SqliteDatabaseTransaction<'a> {
    async fn points_for_station(
        &mut self,
        station: &Id<Station>,
    ) -> capture::database::Result<Vec<GeoPoint>> {
        queries::capture::points_for_station(&mut *self.tx, station).await
    }

    async fn insert_capture(
        &mut self,
        capture: CaptureRecord,
    ) -> capture::database::Result<WithId<CaptureRecord>> {
        queries::capture::insert(&mut *self.tx, capture).await
    }

    async fn get_captures(
        &mut self,
        filter: &CaptureFilter,
    ) -> capture::database::Result<Vec<WithId<CaptureRecord>>> {
        queries::capture::get_filtered(&mut *self.tx, filter).await
    }

    async fn capture_summary(
        &mut self,
        since: DateTime<Utc>,
    ) -> capture::database::Result<CaptureSummary> {
        Ok(CaptureSummary {
            total_stations: queries::station::count(&mut *self.tx).await?,
            total_captures: queries::capture::count(&mut *self.tx, None).await?,
            since,
            captures_since: queries::capture::count(&mut *self.tx, Some(since)).await?,
            stations: queries::capture::per_station(&mut *self.tx).await?,
        })
    }
}

impl<'a> DatabaseOperations for SqliteDatabaseTransaction<'a> {}
