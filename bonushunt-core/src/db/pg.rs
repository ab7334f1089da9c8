use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, query, query_as, query_scalar, Error as SqlxError, PgPool};

use crate::{
    BonusData, Database, DatabaseError, DatabaseResult, HuntData, IntoDatabaseError, LiveHuntData,
    NewBonus, NewHunt, NewSession, NewSlot, NewUser, PrimaryKey, Result, SessionData, SlotData,
    UpdatedBonus, UpdatedHunt, UserData,
};

/// A postgres database implementation for bonushunt
pub struct PgDatabase {
    pool: PgPool,
}

/// Flat session row, composed with its user by the queries below
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    user_id: PrimaryKey,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        query_as::<_, UserData>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        query_as::<_, UserData>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "username"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_username(&new_user.username)
            .await
            .conflict_or_ok("user", "username", &new_user.username)?;

        query_as::<_, UserData>(
            "INSERT INTO users (username, password, display_name)
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new_user.username)
        .bind(new_user.password)
        .bind(new_user.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        // An expired session is as good as a missing one
        let row = query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        let user = self.user_by_id(row.user_id).await?;

        Ok(SessionData {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            user,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let token = query_scalar::<_, String>(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ($1, $2, $3) RETURNING token",
        )
        .bind(new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        query("DELETE FROM sessions WHERE now() > expires_at")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn hunt_by_id(&self, hunt_id: PrimaryKey) -> Result<HuntData> {
        query_as::<_, HuntData>("SELECT * FROM hunts WHERE id = $1")
            .bind(hunt_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("hunt", "id"))
    }

    async fn hunt_by_public_token(&self, token: &str) -> Result<HuntData> {
        query_as::<_, HuntData>("SELECT * FROM hunts WHERE public_token = $1")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("hunt", "public_token"))
    }

    async fn list_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<HuntData>> {
        let result = match owner_id {
            Some(owner_id) => {
                query_as::<_, HuntData>(
                    "SELECT * FROM hunts WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                query_as::<_, HuntData>("SELECT * FROM hunts ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        };

        result.map_err(|e| e.any())
    }

    async fn list_public_hunts(&self, owner_id: Option<PrimaryKey>) -> Result<Vec<LiveHuntData>> {
        let result = match owner_id {
            Some(owner_id) => {
                query_as::<_, LiveHuntData>(
                    "SELECT hunts.*, COALESCE(users.display_name, 'Unknown') AS owner_name
                     FROM hunts
                        LEFT JOIN users ON hunts.owner_id = users.id
                     WHERE hunts.is_public = true AND hunts.owner_id = $1
                     ORDER BY hunts.updated_at DESC, hunts.id DESC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                query_as::<_, LiveHuntData>(
                    "SELECT hunts.*, COALESCE(users.display_name, 'Unknown') AS owner_name
                     FROM hunts
                        LEFT JOIN users ON hunts.owner_id = users.id
                     WHERE hunts.is_public = true
                     ORDER BY hunts.updated_at DESC, hunts.id DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        };

        result.map_err(|e| e.any())
    }

    async fn latest_hunt(&self, owner_id: Option<PrimaryKey>) -> Result<HuntData> {
        let result = match owner_id {
            Some(owner_id) => {
                query_as::<_, HuntData>(
                    "SELECT * FROM hunts WHERE owner_id = $1
                     ORDER BY created_at DESC, id DESC LIMIT 1",
                )
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                query_as::<_, HuntData>(
                    "SELECT * FROM hunts ORDER BY created_at DESC, id DESC LIMIT 1",
                )
                .fetch_one(&self.pool)
                .await
            }
        };

        result.map_err(|e| e.not_found_or("hunt", "latest"))
    }

    async fn create_hunt(&self, new_hunt: NewHunt) -> Result<HuntData> {
        query_as::<_, HuntData>(
            "INSERT INTO hunts
                (owner_id, title, casino, currency, start_balance, notes, is_public, public_token)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(new_hunt.owner_id)
        .bind(new_hunt.title)
        .bind(new_hunt.casino)
        .bind(new_hunt.currency)
        .bind(new_hunt.start_balance)
        .bind(new_hunt.notes)
        .bind(new_hunt.is_public)
        .bind(new_hunt.public_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_hunt(&self, updated_hunt: UpdatedHunt) -> Result<HuntData> {
        let hunt = self.hunt_by_id(updated_hunt.id).await?;

        query(
            "UPDATE hunts SET
                title = $1,
                casino = $2,
                currency = $3,
                start_balance = $4,
                end_balance = $5,
                notes = $6,
                is_public = $7,
                status = $8,
                current_slot_index = $9,
                total_won = $10,
                updated_at = now()
            WHERE id = $11",
        )
        .bind(updated_hunt.title.unwrap_or(hunt.title))
        .bind(updated_hunt.casino.unwrap_or(hunt.casino))
        .bind(updated_hunt.currency.unwrap_or(hunt.currency))
        .bind(updated_hunt.start_balance.unwrap_or(hunt.start_balance))
        .bind(updated_hunt.end_balance.or(hunt.end_balance))
        .bind(updated_hunt.notes.or(hunt.notes))
        .bind(updated_hunt.is_public.unwrap_or(hunt.is_public))
        .bind(updated_hunt.status.unwrap_or(hunt.status))
        .bind(
            updated_hunt
                .current_slot_index
                .unwrap_or(hunt.current_slot_index),
        )
        .bind(updated_hunt.total_won.unwrap_or(hunt.total_won))
        .bind(updated_hunt.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.hunt_by_id(updated_hunt.id).await
    }

    async fn delete_hunt(&self, hunt_id: PrimaryKey) -> Result<()> {
        // Ensure hunt exists. Bonuses go with it via ON DELETE CASCADE.
        let _ = self.hunt_by_id(hunt_id).await?;

        query("DELETE FROM hunts WHERE id = $1")
            .bind(hunt_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn bonus_by_id(&self, bonus_id: PrimaryKey) -> Result<BonusData> {
        query_as::<_, BonusData>("SELECT * FROM bonuses WHERE id = $1")
            .bind(bonus_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("bonus", "id"))
    }

    async fn bonuses_by_hunt_id(&self, hunt_id: PrimaryKey) -> Result<Vec<BonusData>> {
        query_as::<_, BonusData>(
            "SELECT * FROM bonuses WHERE hunt_id = $1 ORDER BY sort_order ASC, id ASC",
        )
        .bind(hunt_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_bonus(&self, new_bonus: NewBonus) -> Result<BonusData> {
        query_as::<_, BonusData>(
            "INSERT INTO bonuses
                (hunt_id, slot_name, provider, image_url, bet_amount, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new_bonus.hunt_id)
        .bind(new_bonus.slot_name)
        .bind(new_bonus.provider)
        .bind(new_bonus.image_url)
        .bind(new_bonus.bet_amount)
        .bind(new_bonus.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_bonus(&self, updated_bonus: UpdatedBonus) -> Result<BonusData> {
        let bonus = self.bonus_by_id(updated_bonus.id).await?;

        query(
            "UPDATE bonuses SET
                slot_name = $1,
                provider = $2,
                image_url = $3,
                bet_amount = $4,
                sort_order = $5
            WHERE id = $6",
        )
        .bind(updated_bonus.slot_name.unwrap_or(bonus.slot_name))
        .bind(updated_bonus.provider.unwrap_or(bonus.provider))
        .bind(updated_bonus.image_url.or(bonus.image_url))
        .bind(updated_bonus.bet_amount.unwrap_or(bonus.bet_amount))
        .bind(updated_bonus.sort_order.unwrap_or(bonus.sort_order))
        .bind(updated_bonus.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.bonus_by_id(updated_bonus.id).await
    }

    async fn open_bonus(
        &self,
        bonus_id: PrimaryKey,
        win_amount: f64,
        multiplier: f64,
    ) -> Result<BonusData> {
        // Conditioned on the waiting state so a double submission can't
        // overwrite an already recorded payout
        query_as::<_, BonusData>(
            "UPDATE bonuses SET
                win_amount = $2,
                multiplier = $3,
                status = 'opened'
            WHERE id = $1 AND status = 'waiting'
            RETURNING *",
        )
        .bind(bonus_id)
        .bind(win_amount)
        .bind(multiplier)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("bonus", "id"))
    }

    async fn delete_bonus(&self, bonus_id: PrimaryKey) -> Result<()> {
        // Ensure bonus exists
        let _ = self.bonus_by_id(bonus_id).await?;

        query("DELETE FROM bonuses WHERE id = $1")
            .bind(bonus_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn slot_by_name(&self, name: &str) -> Result<SlotData> {
        query_as::<_, SlotData>("SELECT * FROM slots WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("slot", "name"))
    }

    async fn search_slots(&self, search: &str) -> Result<Vec<SlotData>> {
        query_as::<_, SlotData>(
            "SELECT * FROM slots
             WHERE name ILIKE '%' || $1 || '%'
             ORDER BY name ASC LIMIT 20",
        )
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_slot(&self, new_slot: NewSlot) -> Result<SlotData> {
        self.slot_by_name(&new_slot.name)
            .await
            .conflict_or_ok("slot", "name", &new_slot.name)?;

        query_as::<_, SlotData>(
            "INSERT INTO slots (name, provider, image_url, category)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new_slot.name)
        .bind(new_slot.provider)
        .bind(new_slot.image_url)
        .bind(new_slot.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn slot_count(&self) -> Result<i64> {
        query_scalar::<_, i64>("SELECT COUNT(*) FROM slots")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
