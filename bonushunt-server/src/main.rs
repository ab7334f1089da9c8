use std::{env, fs, sync::Arc};

use bonushunt_core::{PgDatabase, Tracker};
use bonushunt_server::{logging, run_server, ServerContext};
use log::{error, info};

#[tokio::main]
async fn main() {
    logging::init_logger();

    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            error!("DATABASE_URL must be set to a postgres connection string");
            return;
        }
    };

    info!("Connecting to database...");

    let database = match PgDatabase::new(&database_url).await {
        Ok(database) => database,
        Err(e) => {
            error!("Could not initialize database: {e}");
            error!("Make sure the postgres instance is running and reachable, then try again.");
            return;
        }
    };

    let tracker = Tracker::new(database);

    // Seed the slot catalog on first start, when a CSV is provided
    if let Ok(path) = env::var("BONUSHUNT_SLOTS_CSV") {
        match fs::read_to_string(&path) {
            Ok(csv_data) => match tracker.slots.ensure_catalog(&csv_data).await {
                Ok(0) => {}
                Ok(imported) => info!("Slot catalog initialized with {imported} slots"),
                Err(e) => error!("Slot catalog import failed: {e}"),
            },
            Err(e) => error!("Could not read slot catalog at {path}: {e}"),
        }
    }

    info!("Initialized successfully.");

    run_server(ServerContext {
        tracker: Arc::new(tracker),
    })
    .await
}
