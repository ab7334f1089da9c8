use std::sync::Arc;

use axum::extract::FromRef;
use bonushunt_core::{PgDatabase, Tracker};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub tracker: Arc<Tracker<PgDatabase>>,
}
