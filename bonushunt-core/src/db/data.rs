use chrono::{DateTime, Utc};

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// The lifecycle state of a hunt. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "hunt_status", rename_all = "lowercase")]
pub enum HuntStatus {
    /// Bonuses are being collected, nothing has been opened yet
    Collecting,
    /// The operator is opening bonuses one by one
    Opening,
    /// Every bonus was opened, or the operator stopped early
    Finished,
}

/// The lifecycle state of a single bonus. `Waiting` until its payout is
/// recorded, then `Opened` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bonus_status", rename_all = "lowercase")]
pub enum BonusStatus {
    Waiting,
    Opened,
}

impl HuntStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Opening => "opening",
            Self::Finished => "finished",
        }
    }

    /// A hunt is playing while bonuses are being opened
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Opening)
    }
}

impl BonusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Opened => "opened",
        }
    }
}

/// A bonushunt account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    pub password: String,
    pub display_name: String,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A tracked sequence of slot-bonus openings with a starting bankroll
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HuntData {
    pub id: PrimaryKey,
    /// The user this hunt belongs to
    pub owner_id: PrimaryKey,
    pub title: String,
    pub casino: String,
    /// Currency code, for display only
    pub currency: String,
    pub start_balance: f64,
    pub end_balance: Option<f64>,
    pub status: HuntStatus,
    pub notes: Option<String>,
    pub is_public: bool,
    /// Unguessable capability token granting unauthenticated read access.
    /// Unique and immutable for the lifetime of the hunt.
    pub public_token: String,
    /// Cursor into the ordered bonus list, reset when playing starts
    pub current_slot_index: i32,
    /// Sum of win amounts over played bonuses, maintained by the
    /// lifecycle engine
    pub total_won: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HuntData {
    pub fn is_playing(&self) -> bool {
        self.status.is_playing()
    }
}

/// One slot-machine bonus-round entry within a hunt
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BonusData {
    pub id: PrimaryKey,
    /// The hunt this bonus belongs to. Deleted along with it.
    pub hunt_id: PrimaryKey,
    pub slot_name: String,
    pub provider: String,
    pub image_url: Option<String>,
    pub bet_amount: f64,
    /// `win_amount / bet_amount`, set when the payout is recorded
    pub multiplier: Option<f64>,
    pub win_amount: Option<f64>,
    /// User-assigned ordering key within the hunt
    pub sort_order: i32,
    pub status: BonusStatus,
    pub created_at: DateTime<Utc>,
}

impl BonusData {
    pub fn is_played(&self) -> bool {
        self.status == BonusStatus::Opened
    }
}

/// A public hunt annotated with its owner's display name,
/// as shown on the live list
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LiveHuntData {
    #[sqlx(flatten)]
    pub hunt: HuntData,
    /// "Unknown" when the owner row no longer exists
    pub owner_name: String,
}

/// An entry of the slot reference catalog
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SlotData {
    pub id: PrimaryKey,
    pub name: String,
    pub provider: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
}
