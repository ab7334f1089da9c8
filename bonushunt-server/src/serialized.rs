//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from the core types

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use bonushunt_core::{
    BonusData, HuntData, HuntStats as CoreHuntStats, LiveHuntData, OverallStats as CoreOverallStats,
    SessionData, SlotData, UserData,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i32,
    username: String,
    display_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Hunt {
    id: i32,
    title: String,
    casino: String,
    currency: String,
    start_balance: f64,
    end_balance: Option<f64>,
    status: String,
    notes: Option<String>,
    is_public: bool,
    public_token: String,
    is_playing: bool,
    current_slot_index: i32,
    total_won: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Bonus {
    id: i32,
    hunt_id: i32,
    slot_name: String,
    provider: String,
    image_url: Option<String>,
    bet_amount: f64,
    multiplier: Option<f64>,
    win_amount: Option<f64>,
    sort_order: i32,
    status: String,
    is_played: bool,
}

/// A hunt with its ordered bonus list, the overlay read surface
#[derive(Debug, Serialize, ToSchema)]
pub struct HuntWithBonuses {
    pub hunt: Hunt,
    pub bonuses: Vec<Bonus>,
}

/// An entry of the live hunt list
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveHunt {
    #[serde(flatten)]
    hunt: Hunt,
    owner_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HuntStats {
    total_bonuses: usize,
    played_bonuses: usize,
    progress: f64,
    total_cost: f64,
    total_win: f64,
    avg_bet: f64,
    roi_percent: f64,
    break_even_multiplier: f64,
    best_win: Option<Bonus>,
    best_multiplier: Option<Bonus>,
    next_bonus: Option<Bonus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OverallStats {
    total_hunts: usize,
    active_hunts: usize,
    total_spent: f64,
    total_won: f64,
}

/// Link info the admin UI shows for embedding the latest hunt
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicLink {
    pub hunt_id: i32,
    pub public_token: String,
    pub title: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Slot {
    name: String,
    provider: String,
    image_url: Option<String>,
    category: Option<String>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl<I, O> ToSerialized<Option<O>> for Option<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Option<O> {
        self.as_ref().map(|x| x.to_serialized())
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Hunt> for HuntData {
    fn to_serialized(&self) -> Hunt {
        Hunt {
            id: self.id,
            title: self.title.clone(),
            casino: self.casino.clone(),
            currency: self.currency.clone(),
            start_balance: self.start_balance,
            end_balance: self.end_balance,
            status: self.status.as_str().to_string(),
            notes: self.notes.clone(),
            is_public: self.is_public,
            public_token: self.public_token.clone(),
            is_playing: self.is_playing(),
            current_slot_index: self.current_slot_index,
            total_won: self.total_won,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ToSerialized<Bonus> for BonusData {
    fn to_serialized(&self) -> Bonus {
        Bonus {
            id: self.id,
            hunt_id: self.hunt_id,
            slot_name: self.slot_name.clone(),
            provider: self.provider.clone(),
            image_url: self.image_url.clone(),
            bet_amount: self.bet_amount,
            multiplier: self.multiplier,
            win_amount: self.win_amount,
            sort_order: self.sort_order,
            status: self.status.as_str().to_string(),
            is_played: self.is_played(),
        }
    }
}

impl ToSerialized<LiveHunt> for LiveHuntData {
    fn to_serialized(&self) -> LiveHunt {
        LiveHunt {
            hunt: self.hunt.to_serialized(),
            owner_name: self.owner_name.clone(),
        }
    }
}

impl ToSerialized<HuntStats> for CoreHuntStats {
    fn to_serialized(&self) -> HuntStats {
        HuntStats {
            total_bonuses: self.total_bonuses,
            played_bonuses: self.played_bonuses,
            progress: self.progress,
            total_cost: self.total_cost,
            total_win: self.total_win,
            avg_bet: self.avg_bet,
            roi_percent: self.roi_percent,
            break_even_multiplier: self.break_even_multiplier,
            best_win: self.best_win.to_serialized(),
            best_multiplier: self.best_multiplier.to_serialized(),
            next_bonus: self.next_bonus.to_serialized(),
        }
    }
}

impl ToSerialized<OverallStats> for CoreOverallStats {
    fn to_serialized(&self) -> OverallStats {
        OverallStats {
            total_hunts: self.total_hunts,
            active_hunts: self.active_hunts,
            total_spent: self.total_spent,
            total_won: self.total_won,
        }
    }
}

impl ToSerialized<Slot> for SlotData {
    fn to_serialized(&self) -> Slot {
        Slot {
            name: self.name.clone(),
            provider: self.provider.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
        }
    }
}
