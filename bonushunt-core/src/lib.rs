mod auth;
mod db;
mod hunts;
mod public;
mod slots;
mod stats;
mod util;

use std::sync::Arc;

pub use auth::*;
pub use db::*;
pub use hunts::*;
pub use public::*;
pub use slots::*;
pub use stats::*;

/// The bonushunt tracker, facilitating hunt lifecycle, statistics,
/// public exposure, and authentication.
pub struct Tracker<Db> {
    database: Arc<Db>,

    pub auth: Auth<Db>,
    pub hunts: Hunts<Db>,
    pub public: Public<Db>,
    pub slots: Slots<Db>,
}

impl<Db> Tracker<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let database = Arc::new(database);

        Self {
            auth: Auth::new(&database),
            hunts: Hunts::new(&database),
            public: Public::new(&database),
            slots: Slots::new(&database),
            database,
        }
    }

    /// Direct access to the underlying store, for read paths that need
    /// no lifecycle involvement
    pub fn database(&self) -> &Arc<Db> {
        &self.database
    }
}
