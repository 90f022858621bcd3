use std::sync::Arc;

use capture::client::Client;
use database::{DatabaseConnectionInfo, SqliteDatabase};
use web::{config::Config, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    // configuration
    let config = Config::load().expect("invalid configuration in env.");

    // database
    let database = SqliteDatabase::connect(DatabaseConnectionInfo::from_env())
        .await
        .expect("could not connect to database.");

    // capture client
    let capture_client = Client::new(database, config.proximity_threshold_meters);
    capture_client
        .check_configuration()
        .expect("invalid proximity threshold.");
    log::info!(
        "captures closer than {} m to a prior capture of the same station are rejected",
        config.proximity_threshold_meters
    );

    // web server
    let web_future = start_web_server(WebState {
        capture_client,
        config: Arc::new(config),
    });

    if let Err(why) = web_future.await {
        log::error!("web server stopped: {}", why);
    }
}
