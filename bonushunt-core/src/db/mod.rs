use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod pg;
pub use pg::*;

#[cfg(test)]
pub mod memory;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound { .. } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch bonushunt data from a database
#[async_trait]
pub trait Database: Send + Sync {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn hunt_by_id(&self, hunt_id: PrimaryKey) -> Result<HuntData>;
    async fn hunt_by_public_token(&self, token: &str) -> Result<HuntData>;
    /// Hunts for one owner, or every hunt, newest-created first
    async fn list_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<HuntData>>;
    /// Public hunts annotated with their owner's name, newest-updated first
    async fn list_public_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<LiveHuntData>>;
    /// The most recently created hunt. Ties on creation time break on id
    /// so overlays never flicker between two hunts.
    async fn latest_hunt(&self, owner_id: Option<PrimaryKey>) -> Result<HuntData>;
    async fn create_hunt(&self, new_hunt: NewHunt) -> Result<HuntData>;
    async fn update_hunt(&self, updated_hunt: UpdatedHunt) -> Result<HuntData>;
    async fn delete_hunt(&self, hunt_id: PrimaryKey) -> Result<()>;

    async fn bonus_by_id(&self, bonus_id: PrimaryKey) -> Result<BonusData>;
    /// Bonuses of a hunt, ordered by their sort key ascending
    async fn bonuses_by_hunt_id(&self, hunt_id: PrimaryKey) -> Result<Vec<BonusData>>;
    async fn create_bonus(&self, new_bonus: NewBonus) -> Result<BonusData>;
    async fn update_bonus(&self, updated_bonus: UpdatedBonus) -> Result<BonusData>;
    /// Records a payout, conditioned on the bonus still being in the
    /// waiting state. Returns `NotFound` when the bonus is missing *or*
    /// already opened, so callers must check existence first to tell
    /// the two apart.
    async fn open_bonus(
        &self,
        bonus_id: PrimaryKey,
        win_amount: f64,
        multiplier: f64,
    ) -> Result<BonusData>;
    async fn delete_bonus(&self, bonus_id: PrimaryKey) -> Result<()>;

    async fn slot_by_name(&self, name: &str) -> Result<SlotData>;
    /// Case-insensitive substring search over slot names
    async fn search_slots(&self, query: &str) -> Result<Vec<SlotData>>;
    async fn create_slot(&self, new_slot: NewSlot) -> Result<SlotData>;
    async fn slot_count(&self) -> Result<i64>;
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewHunt {
    /// The owner of the new hunt
    pub owner_id: PrimaryKey,
    pub title: String,
    pub casino: String,
    pub currency: String,
    pub start_balance: f64,
    pub notes: Option<String>,
    pub is_public: bool,
    /// Assigned by the lifecycle engine, never chosen by the caller
    pub public_token: String,
}

/// A partial hunt update. `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct UpdatedHunt {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub casino: Option<String>,
    pub currency: Option<String>,
    pub start_balance: Option<f64>,
    pub end_balance: Option<f64>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
    pub status: Option<HuntStatus>,
    pub current_slot_index: Option<i32>,
    pub total_won: Option<f64>,
}

#[derive(Debug)]
pub struct NewBonus {
    pub hunt_id: PrimaryKey,
    pub slot_name: String,
    pub provider: String,
    pub image_url: Option<String>,
    pub bet_amount: f64,
    pub sort_order: i32,
}

/// A partial bonus update for the fields an owner may edit directly.
/// Payout fields are only ever written by [Database::open_bonus].
#[derive(Debug, Default)]
pub struct UpdatedBonus {
    pub id: PrimaryKey,
    pub slot_name: Option<String>,
    pub provider: Option<String>,
    pub image_url: Option<String>,
    pub bet_amount: Option<f64>,
    pub sort_order: Option<i32>,
}

#[derive(Debug)]
pub struct NewSlot {
    pub name: String,
    pub provider: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
}
