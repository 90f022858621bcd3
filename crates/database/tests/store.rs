use capture::database::{CaptureFilter, CaptureRepo, Database, DatabaseTransaction, StationRepo};
use chrono::{Duration, TimeZone, Utc};
use database::{DatabaseConnectionInfo, SqliteDatabase};
use model::{
    capture::CaptureRecord, geo_point::GeoPoint, station::Station, WithId,
};
use utility::id::Id;

async fn database() -> SqliteDatabase {
    SqliteDatabase::connect(DatabaseConnectionInfo::in_memory())
        .await
        .expect("in-memory database")
}

fn station(id: &str, name: &str) -> WithId<Station> {
    WithId::new(
        Id::new(id.to_owned()),
        Station {
            name: name.to_owned(),
            owner_name: Some("Owner".to_owned()),
            phone: None,
            station_type: Some("Petrol Station".to_owned()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        },
    )
}

fn record(station: &str, latitude: f64, longitude: f64, minutes: i64) -> CaptureRecord {
    CaptureRecord {
        station_id: Id::new(station.to_owned()),
        point: GeoPoint {
            latitude,
            longitude,
        },
        accuracy_meters: Some(10.0),
        captured_at: Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
            + Duration::minutes(minutes),
    }
}

#[tokio::test]
async fn stations_round_trip() {
    let database = database().await;
    let mut auto = database.auto();

    let inserted = auto
        .insert_station(station("STN-0000000A", "Ikeja"))
        .await
        .unwrap();
    assert_eq!(inserted.id.raw(), "STN-0000000A");

    let fetched = auto.get_station(&inserted.id).await.unwrap();
    assert_eq!(fetched.content.name, "Ikeja");
    assert_eq!(fetched.content.owner_name.as_deref(), Some("Owner"));
    assert_eq!(fetched.content.phone, None);
    assert_eq!(fetched.content.created_at, inserted.content.created_at);

    assert!(auto.station_exists(&inserted.id).await.unwrap());
    assert!(!auto
        .station_exists(&Id::new("STN-FFFFFFFF".to_owned()))
        .await
        .unwrap());
}

#[tokio::test]
async fn unknown_station_is_not_found() {
    let database = database().await;
    let result = database
        .auto()
        .get_station(&Id::new("STN-FFFFFFFF".to_owned()))
        .await;
    assert!(matches!(
        result,
        Err(capture::database::DatabaseError::NotFound)
    ));
}

#[tokio::test]
async fn points_are_scoped_to_their_station() {
    let database = database().await;
    let mut auto = database.auto();
    auto.insert_station(station("STN-0000000A", "A")).await.unwrap();
    auto.insert_station(station("STN-0000000B", "B")).await.unwrap();

    auto.insert_capture(record("STN-0000000A", 6.5, 3.3, 0)).await.unwrap();
    auto.insert_capture(record("STN-0000000A", 6.6, 3.3, 1)).await.unwrap();
    auto.insert_capture(record("STN-0000000B", 9.0, 7.4, 2)).await.unwrap();

    let points = auto
        .points_for_station(&Id::new("STN-0000000A".to_owned()))
        .await
        .unwrap();
    assert_eq!(points.len(), 2);
    assert!(points.contains(&GeoPoint {
        latitude: 6.6,
        longitude: 3.3
    }));

    let points = auto
        .points_for_station(&Id::new("STN-0000000B".to_owned()))
        .await
        .unwrap();
    assert_eq!(
        points,
        vec![GeoPoint {
            latitude: 9.0,
            longitude: 7.4
        }]
    );
}

#[tokio::test]
async fn captures_are_filtered_and_newest_first() {
    let database = database().await;
    let mut auto = database.auto();
    auto.insert_station(station("STN-0000000A", "A")).await.unwrap();
    auto.insert_station(station("STN-0000000B", "B")).await.unwrap();

    auto.insert_capture(record("STN-0000000A", 6.5, 3.3, 0)).await.unwrap();
    auto.insert_capture(record("STN-0000000B", 9.0, 7.4, 10)).await.unwrap();
    auto.insert_capture(record("STN-0000000A", 6.6, 3.3, 20)).await.unwrap();

    let all = auto.get_captures(&CaptureFilter::default()).await.unwrap();
    let minutes = all
        .iter()
        .map(|c| c.content.captured_at.format("%M").to_string())
        .collect::<Vec<_>>();
    assert_eq!(minutes, vec!["20", "10", "00"]);

    let only_a = auto
        .get_captures(&CaptureFilter {
            station: Some(Id::new("STN-0000000A".to_owned())),
            since: None,
        })
        .await
        .unwrap();
    assert_eq!(only_a.len(), 2);
    assert!(only_a
        .iter()
        .all(|c| c.content.station_id.raw() == "STN-0000000A"));

    let recent = auto
        .get_captures(&CaptureFilter {
            station: None,
            since: Some(Utc.with_ymd_and_hms(2024, 5, 2, 12, 5, 0).unwrap()),
        })
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn summary_counts_stations_and_captures() {
    let database = database().await;
    let mut auto = database.auto();
    auto.insert_station(station("STN-0000000A", "Alpha")).await.unwrap();
    auto.insert_station(station("STN-0000000B", "Bravo")).await.unwrap();
    auto.insert_station(station("STN-0000000C", "Charlie")).await.unwrap();

    auto.insert_capture(record("STN-0000000B", 9.0, 7.4, 0)).await.unwrap();
    auto.insert_capture(record("STN-0000000B", 9.1, 7.4, 30)).await.unwrap();
    auto.insert_capture(record("STN-0000000A", 6.5, 3.3, 90)).await.unwrap();

    let since = Utc.with_ymd_and_hms(2024, 5, 2, 12, 15, 0).unwrap();
    let summary = auto.capture_summary(since).await.unwrap();
    assert_eq!(summary.total_stations, 3);
    assert_eq!(summary.total_captures, 3);
    assert_eq!(summary.captures_since, 2);

    let counts = summary
        .stations
        .iter()
        .map(|s| (s.name.as_str(), s.capture_count))
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![("Bravo", 2), ("Alpha", 1), ("Charlie", 0)]);
    assert_eq!(
        summary.stations[0].last_captured_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 2, 12, 30, 0).unwrap())
    );
    assert_eq!(summary.stations[2].last_captured_at, None);
}

#[tokio::test]
async fn uncommitted_transaction_is_rolled_back() {
    let database = database().await;
    database
        .auto()
        .insert_station(station("STN-0000000A", "A"))
        .await
        .unwrap();

    {
        let mut tx = database.transaction().await.unwrap();
        tx.insert_capture(record("STN-0000000A", 6.5, 3.3, 0))
            .await
            .unwrap();
    }

    let mut tx = database.transaction().await.unwrap();
    tx.insert_capture(record("STN-0000000A", 7.5, 3.3, 1))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let points = database
        .auto()
        .points_for_station(&Id::new("STN-0000000A".to_owned()))
        .await
        .unwrap();
    assert_eq!(
        points,
        vec![GeoPoint {
            latitude: 7.5,
            longitude: 3.3
        }]
    );
}
