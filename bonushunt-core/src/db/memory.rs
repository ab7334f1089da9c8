//! An in-memory [Database] used by the test suites. Mirrors the
//! ordering and conflict semantics of the postgres implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    BonusData, BonusStatus, Database, DatabaseError, DatabaseResult, HuntData, HuntStatus,
    LiveHuntData, NewBonus, NewHunt, NewSession, NewSlot, NewUser, PrimaryKey, Result,
    SessionData, SlotData, UpdatedBonus, UpdatedHunt, UserData,
};

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: PrimaryKey,
    users: Vec<UserData>,
    sessions: Vec<StoredSession>,
    hunts: Vec<HuntData>,
    bonuses: Vec<BonusData>,
    slots: Vec<SlotData>,
}

struct StoredSession {
    id: PrimaryKey,
    token: String,
    user_id: PrimaryKey,
    expires_at: DateTime<Utc>,
}

impl State {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

fn not_found(resource: &'static str, identifier: &'static str) -> DatabaseError {
    DatabaseError::NotFound {
        resource,
        identifier,
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(not_found("user", "id"))
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(not_found("user", "username"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_username(&new_user.username)
            .await
            .conflict_or_ok("user", "username", &new_user.username)?;

        let mut state = self.state.lock();
        let user = UserData {
            id: state.next_id(),
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let (id, user_id, expires_at) = {
            let state = self.state.lock();
            // An expired session is as good as a missing one
            let session = state
                .sessions
                .iter()
                .find(|s| s.token == token && s.expires_at > Utc::now())
                .ok_or(not_found("session", "token"))?;

            (session.id, session.user_id, session.expires_at)
        };

        let user = self.user_by_id(user_id).await?;

        Ok(SessionData {
            id,
            token: token.to_string(),
            expires_at,
            user,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let token = new_session.token.clone();

        {
            let mut state = self.state.lock();
            let id = state.next_id();

            state.sessions.push(StoredSession {
                id,
                token: new_session.token,
                user_id: new_session.user_id,
                expires_at: new_session.expires_at,
            });
        }

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let _ = self.session_by_token(token).await?;
        self.state.lock().sessions.retain(|s| s.token != token);
        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        let now = Utc::now();
        self.state.lock().sessions.retain(|s| s.expires_at > now);
        Ok(())
    }

    async fn hunt_by_id(&self, hunt_id: PrimaryKey) -> Result<HuntData> {
        self.state
            .lock()
            .hunts
            .iter()
            .find(|h| h.id == hunt_id)
            .cloned()
            .ok_or(not_found("hunt", "id"))
    }

    async fn hunt_by_public_token(&self, token: &str) -> Result<HuntData> {
        self.state
            .lock()
            .hunts
            .iter()
            .find(|h| h.public_token == token)
            .cloned()
            .ok_or(not_found("hunt", "public_token"))
    }

    async fn list_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<HuntData>> {
        let mut hunts: Vec<_> = self
            .state
            .lock()
            .hunts
            .iter()
            .filter(|h| owner_id.map(|o| h.owner_id == o).unwrap_or(true))
            .cloned()
            .collect();

        hunts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(hunts)
    }

    async fn list_public_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<LiveHuntData>> {
        let state = self.state.lock();

        let mut hunts: Vec<_> = state
            .hunts
            .iter()
            .filter(|h| h.is_public)
            .filter(|h| owner_id.map(|o| h.owner_id == o).unwrap_or(true))
            .cloned()
            .collect();

        hunts.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));

        let live = hunts
            .into_iter()
            .map(|hunt| {
                let owner_name = state
                    .users
                    .iter()
                    .find(|u| u.id == hunt.owner_id)
                    .map(|u| u.display_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());

                LiveHuntData { hunt, owner_name }
            })
            .collect();

        Ok(live)
    }

    async fn latest_hunt(&self, owner_id: Option<PrimaryKey>) -> Result<HuntData> {
        self.list_hunts(owner_id)
            .await?
            .into_iter()
            .next()
            .ok_or(not_found("hunt", "latest"))
    }

    async fn create_hunt(&self, new_hunt: NewHunt) -> Result<HuntData> {
        let mut state = self.state.lock();
        let now = Utc::now();

        let hunt = HuntData {
            id: state.next_id(),
            owner_id: new_hunt.owner_id,
            title: new_hunt.title,
            casino: new_hunt.casino,
            currency: new_hunt.currency,
            start_balance: new_hunt.start_balance,
            end_balance: None,
            status: HuntStatus::Collecting,
            notes: new_hunt.notes,
            is_public: new_hunt.is_public,
            public_token: new_hunt.public_token,
            current_slot_index: 0,
            total_won: 0.0,
            created_at: now,
            updated_at: now,
        };

        state.hunts.push(hunt.clone());
        Ok(hunt)
    }

    async fn update_hunt(&self, updated_hunt: UpdatedHunt) -> Result<HuntData> {
        let mut state = self.state.lock();
        let hunt = state
            .hunts
            .iter_mut()
            .find(|h| h.id == updated_hunt.id)
            .ok_or(not_found("hunt", "id"))?;

        if let Some(title) = updated_hunt.title {
            hunt.title = title;
        }
        if let Some(casino) = updated_hunt.casino {
            hunt.casino = casino;
        }
        if let Some(currency) = updated_hunt.currency {
            hunt.currency = currency;
        }
        if let Some(start_balance) = updated_hunt.start_balance {
            hunt.start_balance = start_balance;
        }
        if let Some(end_balance) = updated_hunt.end_balance {
            hunt.end_balance = Some(end_balance);
        }
        if let Some(notes) = updated_hunt.notes {
            hunt.notes = Some(notes);
        }
        if let Some(is_public) = updated_hunt.is_public {
            hunt.is_public = is_public;
        }
        if let Some(status) = updated_hunt.status {
            hunt.status = status;
        }
        if let Some(current_slot_index) = updated_hunt.current_slot_index {
            hunt.current_slot_index = current_slot_index;
        }
        if let Some(total_won) = updated_hunt.total_won {
            hunt.total_won = total_won;
        }

        hunt.updated_at = Utc::now();
        Ok(hunt.clone())
    }

    async fn delete_hunt(&self, hunt_id: PrimaryKey) -> Result<()> {
        let _ = self.hunt_by_id(hunt_id).await?;

        let mut state = self.state.lock();
        state.hunts.retain(|h| h.id != hunt_id);
        // Cascade, like the foreign key does in postgres
        state.bonuses.retain(|b| b.hunt_id != hunt_id);
        Ok(())
    }

    async fn bonus_by_id(&self, bonus_id: PrimaryKey) -> Result<BonusData> {
        self.state
            .lock()
            .bonuses
            .iter()
            .find(|b| b.id == bonus_id)
            .cloned()
            .ok_or(not_found("bonus", "id"))
    }

    async fn bonuses_by_hunt_id(&self, hunt_id: PrimaryKey) -> Result<Vec<BonusData>> {
        let mut bonuses: Vec<_> = self
            .state
            .lock()
            .bonuses
            .iter()
            .filter(|b| b.hunt_id == hunt_id)
            .cloned()
            .collect();

        bonuses.sort_by_key(|b| (b.sort_order, b.id));
        Ok(bonuses)
    }

    async fn create_bonus(&self, new_bonus: NewBonus) -> Result<BonusData> {
        let mut state = self.state.lock();

        let bonus = BonusData {
            id: state.next_id(),
            hunt_id: new_bonus.hunt_id,
            slot_name: new_bonus.slot_name,
            provider: new_bonus.provider,
            image_url: new_bonus.image_url,
            bet_amount: new_bonus.bet_amount,
            multiplier: None,
            win_amount: None,
            sort_order: new_bonus.sort_order,
            status: BonusStatus::Waiting,
            created_at: Utc::now(),
        };

        state.bonuses.push(bonus.clone());
        Ok(bonus)
    }

    async fn update_bonus(&self, updated_bonus: UpdatedBonus) -> Result<BonusData> {
        let mut state = self.state.lock();
        let bonus = state
            .bonuses
            .iter_mut()
            .find(|b| b.id == updated_bonus.id)
            .ok_or(not_found("bonus", "id"))?;

        if let Some(slot_name) = updated_bonus.slot_name {
            bonus.slot_name = slot_name;
        }
        if let Some(provider) = updated_bonus.provider {
            bonus.provider = provider;
        }
        if let Some(image_url) = updated_bonus.image_url {
            bonus.image_url = Some(image_url);
        }
        if let Some(bet_amount) = updated_bonus.bet_amount {
            bonus.bet_amount = bet_amount;
        }
        if let Some(sort_order) = updated_bonus.sort_order {
            bonus.sort_order = sort_order;
        }

        Ok(bonus.clone())
    }

    async fn open_bonus(
        &self,
        bonus_id: PrimaryKey,
        win_amount: f64,
        multiplier: f64,
    ) -> Result<BonusData> {
        let mut state = self.state.lock();
        let bonus = state
            .bonuses
            .iter_mut()
            .find(|b| b.id == bonus_id && b.status == BonusStatus::Waiting)
            .ok_or(not_found("bonus", "id"))?;

        bonus.win_amount = Some(win_amount);
        bonus.multiplier = Some(multiplier);
        bonus.status = BonusStatus::Opened;

        Ok(bonus.clone())
    }

    async fn delete_bonus(&self, bonus_id: PrimaryKey) -> Result<()> {
        let _ = self.bonus_by_id(bonus_id).await?;
        self.state.lock().bonuses.retain(|b| b.id != bonus_id);
        Ok(())
    }

    async fn slot_by_name(&self, name: &str) -> Result<SlotData> {
        self.state
            .lock()
            .slots
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or(not_found("slot", "name"))
    }

    async fn search_slots(&self, query: &str) -> Result<Vec<SlotData>> {
        let query = query.to_lowercase();

        let mut hits: Vec<_> = self
            .state
            .lock()
            .slots
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .cloned()
            .collect();

        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits.truncate(20);
        Ok(hits)
    }

    async fn create_slot(&self, new_slot: NewSlot) -> Result<SlotData> {
        self.slot_by_name(&new_slot.name)
            .await
            .conflict_or_ok("slot", "name", &new_slot.name)?;

        let mut state = self.state.lock();
        let slot = SlotData {
            id: state.next_id(),
            name: new_slot.name,
            provider: new_slot.provider,
            image_url: new_slot.image_url,
            category: new_slot.category,
        };

        state.slots.push(slot.clone());
        Ok(slot)
    }

    async fn slot_count(&self) -> Result<i64> {
        Ok(self.state.lock().slots.len() as i64)
    }
}
