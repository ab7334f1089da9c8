use std::sync::Arc;

use thiserror::Error;

use crate::{
    util::random_string, BonusData, Database, DatabaseError, HuntData, HuntStatus, NewBonus,
    NewHunt, PrimaryKey, UpdatedBonus, UpdatedHunt,
};

/// Length of the capability token granting public read access
const PUBLIC_TOKEN_LENGTH: usize = 32;

/// Owns every hunt and bonus state transition that is not a plain
/// field edit.
pub struct Hunts<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum HuntError {
    #[error("Caller does not own this hunt")]
    NotOwner,
    #[error("Hunt has no bonuses to play")]
    NothingToPlay,
    #[error("Win amount cannot be negative")]
    NegativeWinAmount,
    #[error("Bonus payout was already recorded")]
    AlreadyOpened,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// A hunt as an owner describes it. The lifecycle engine fills in the
/// rest: a fresh public token and the collecting status.
#[derive(Debug)]
pub struct HuntDraft {
    pub owner_id: PrimaryKey,
    pub title: String,
    pub casino: String,
    pub currency: String,
    pub start_balance: f64,
    pub notes: Option<String>,
    pub is_public: bool,
}

impl<Db> Hunts<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Creates a new hunt in the collecting state
    pub async fn create_hunt(&self, draft: HuntDraft) -> Result<HuntData, HuntError> {
        let hunt = self
            .db
            .create_hunt(NewHunt {
                owner_id: draft.owner_id,
                title: draft.title,
                casino: draft.casino,
                currency: draft.currency,
                start_balance: draft.start_balance,
                notes: draft.notes,
                is_public: draft.is_public,
                public_token: random_string(PUBLIC_TOKEN_LENGTH),
            })
            .await?;

        Ok(hunt)
    }

    pub async fn hunt_by_id(&self, hunt_id: PrimaryKey) -> Result<HuntData, HuntError> {
        Ok(self.db.hunt_by_id(hunt_id).await?)
    }

    /// Hunts of one owner, newest first
    pub async fn list_hunts(&self, owner_id: PrimaryKey) -> Result<Vec<HuntData>, HuntError> {
        Ok(self.db.list_hunts(Some(owner_id)).await?)
    }

    /// Edits plain hunt fields. Status is owned by the lifecycle
    /// operations below and cannot be set through here.
    pub async fn update_hunt(
        &self,
        owner_id: PrimaryKey,
        updated_hunt: UpdatedHunt,
    ) -> Result<HuntData, HuntError> {
        let hunt = self.db.hunt_by_id(updated_hunt.id).await?;
        ensure_owner(&hunt, owner_id)?;

        let updated_hunt = UpdatedHunt {
            status: None,
            current_slot_index: None,
            total_won: None,
            ..updated_hunt
        };

        Ok(self.db.update_hunt(updated_hunt).await?)
    }

    /// Deletes a hunt along with all of its bonuses
    pub async fn delete_hunt(
        &self,
        owner_id: PrimaryKey,
        hunt_id: PrimaryKey,
    ) -> Result<(), HuntError> {
        let hunt = self.db.hunt_by_id(hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        Ok(self.db.delete_hunt(hunt_id).await?)
    }

    /// The hunt's bonuses, ordered by their sort key
    pub async fn bonuses(&self, hunt_id: PrimaryKey) -> Result<Vec<BonusData>, HuntError> {
        // Ensure hunt exists
        let _ = self.db.hunt_by_id(hunt_id).await?;

        Ok(self.db.bonuses_by_hunt_id(hunt_id).await?)
    }

    pub async fn add_bonus(
        &self,
        owner_id: PrimaryKey,
        new_bonus: NewBonus,
    ) -> Result<BonusData, HuntError> {
        let hunt = self.db.hunt_by_id(new_bonus.hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        Ok(self.db.create_bonus(new_bonus).await?)
    }

    pub async fn update_bonus(
        &self,
        owner_id: PrimaryKey,
        updated_bonus: UpdatedBonus,
    ) -> Result<BonusData, HuntError> {
        let bonus = self.db.bonus_by_id(updated_bonus.id).await?;
        let hunt = self.db.hunt_by_id(bonus.hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        Ok(self.db.update_bonus(updated_bonus).await?)
    }

    pub async fn delete_bonus(
        &self,
        owner_id: PrimaryKey,
        bonus_id: PrimaryKey,
    ) -> Result<(), HuntError> {
        let bonus = self.db.bonus_by_id(bonus_id).await?;
        let hunt = self.db.hunt_by_id(bonus.hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        Ok(self.db.delete_bonus(bonus_id).await?)
    }

    /// Moves the hunt into the opening state and resets the cursor.
    /// Rejected when there is nothing to play, so a hunt can never be
    /// playing with an empty bonus list.
    pub async fn start_playing(
        &self,
        owner_id: PrimaryKey,
        hunt_id: PrimaryKey,
    ) -> Result<HuntData, HuntError> {
        let hunt = self.db.hunt_by_id(hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        let bonuses = self.db.bonuses_by_hunt_id(hunt_id).await?;

        if bonuses.is_empty() {
            return Err(HuntError::NothingToPlay);
        }

        let hunt = self
            .db
            .update_hunt(UpdatedHunt {
                id: hunt_id,
                status: Some(HuntStatus::Opening),
                current_slot_index: Some(0),
                ..Default::default()
            })
            .await?;

        Ok(hunt)
    }

    /// Finishes the hunt. May be called before every bonus is played.
    pub async fn stop_playing(
        &self,
        owner_id: PrimaryKey,
        hunt_id: PrimaryKey,
    ) -> Result<HuntData, HuntError> {
        let hunt = self.db.hunt_by_id(hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        let hunt = self
            .db
            .update_hunt(UpdatedHunt {
                id: hunt_id,
                status: Some(HuntStatus::Finished),
                ..Default::default()
            })
            .await?;

        Ok(hunt)
    }

    /// Records the payout of a bonus and recomputes the owning hunt's
    /// aggregate state. A bonus can only be opened once, a second
    /// submission fails with [HuntError::AlreadyOpened].
    ///
    /// The payout and the recompute are two separate writes. If the
    /// recompute fails, the persisted `total_won` stays stale until the
    /// next payout or [Self::recompute_hunt_status] call. Readers are
    /// unaffected, stats are always derived from the bonus rows.
    pub async fn record_payout(
        &self,
        owner_id: PrimaryKey,
        bonus_id: PrimaryKey,
        win_amount: f64,
    ) -> Result<BonusData, HuntError> {
        if win_amount < 0.0 {
            return Err(HuntError::NegativeWinAmount);
        }

        let bonus = self.db.bonus_by_id(bonus_id).await?;
        let hunt = self.db.hunt_by_id(bonus.hunt_id).await?;
        ensure_owner(&hunt, owner_id)?;

        if bonus.is_played() {
            return Err(HuntError::AlreadyOpened);
        }

        // Guard against a zero bet so the multiplier can never be NaN
        let multiplier = if bonus.bet_amount > 0.0 {
            win_amount / bonus.bet_amount
        } else {
            0.0
        };

        let opened = self
            .db
            .open_bonus(bonus_id, win_amount, multiplier)
            .await
            .map_err(|e| match e {
                // The bonus existed a moment ago, so the conditional
                // update lost a race against another submission
                DatabaseError::NotFound { .. } => HuntError::AlreadyOpened,
                e => HuntError::Db(e),
            })?;

        self.recompute_hunt_status(bonus.hunt_id).await?;

        Ok(opened)
    }

    /// Re-derives the hunt's persisted total and completion status from
    /// its bonuses. Idempotent, safe to call at any time.
    pub async fn recompute_hunt_status(
        &self,
        hunt_id: PrimaryKey,
    ) -> Result<HuntData, HuntError> {
        let _ = self.db.hunt_by_id(hunt_id).await?;
        let bonuses = self.db.bonuses_by_hunt_id(hunt_id).await?;

        let total_won: f64 = bonuses
            .iter()
            .filter(|b| b.is_played())
            .map(|b| b.win_amount.unwrap_or(0.0))
            .sum();

        let played = bonuses.iter().filter(|b| b.is_played()).count();
        let completed = !bonuses.is_empty() && played == bonuses.len();

        let hunt = self
            .db
            .update_hunt(UpdatedHunt {
                id: hunt_id,
                total_won: Some(total_won),
                status: completed.then_some(HuntStatus::Finished),
                ..Default::default()
            })
            .await?;

        Ok(hunt)
    }
}

fn ensure_owner(hunt: &HuntData, owner_id: PrimaryKey) -> Result<(), HuntError> {
    if hunt.owner_id != owner_id {
        return Err(HuntError::NotOwner);
    }

    Ok(())
}
