//! The data surface an unauthenticated overlay client may read.
//!
//! Possession of a hunt's public token is the authorization to read it,
//! there is no session involved anywhere here.

use std::sync::Arc;

use crate::{
    BonusData, Database, DatabaseError, HuntData, LiveHuntData, PrimaryKey,
};

pub struct Public<Db> {
    db: Arc<Db>,
}

impl<Db> Public<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Resolves a public token to a hunt and its ordered bonuses.
    /// A hunt that was made private is indistinguishable from a missing
    /// one, even with a correct token.
    pub async fn hunt_by_token(
        &self,
        token: &str,
    ) -> Result<(HuntData, Vec<BonusData>), DatabaseError> {
        let hunt = self.db.hunt_by_public_token(token).await?;

        if !hunt.is_public {
            return Err(DatabaseError::NotFound {
                resource: "hunt",
                identifier: "public_token",
            });
        }

        let bonuses = self.db.bonuses_by_hunt_id(hunt.id).await?;

        Ok((hunt, bonuses))
    }

    /// The most recently created hunt with its bonuses, optionally
    /// scoped to one owner. Used by the "latest hunt" overlay family.
    pub async fn latest_hunt(
        &self,
        owner_id: Option<PrimaryKey>,
    ) -> Result<(HuntData, Vec<BonusData>), DatabaseError> {
        let hunt = self.db.latest_hunt(owner_id).await?;
        let bonuses = self.db.bonuses_by_hunt_id(hunt.id).await?;

        Ok((hunt, bonuses))
    }

    /// Every public hunt, newest-updated first, annotated with the
    /// owner's display name
    pub async fn list_live(
        &self,
        owner_id: Option<PrimaryKey>,
    ) -> Result<Vec<LiveHuntData>, DatabaseError> {
        self.db.list_public_hunts(owner_id).await
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::Public;
    use crate::{
        db::memory::MemoryDatabase, Database, NewHunt, PrimaryKey, UpdatedHunt,
    };

    fn setup() -> (Public<MemoryDatabase>, Arc<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::default());
        (Public::new(&db), db)
    }

    fn new_hunt(owner_id: PrimaryKey, title: &str, token: &str, is_public: bool) -> NewHunt {
        NewHunt {
            owner_id,
            title: title.to_string(),
            casino: "Stake".to_string(),
            currency: "USD".to_string(),
            start_balance: 500.0,
            notes: None,
            is_public,
            public_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn private_hunts_are_unreachable_by_token() {
        let (public, db) = setup();
        db.create_hunt(new_hunt(1, "hidden", "secret-token", false))
            .await
            .unwrap();

        let result = public.hunt_by_token("secret-token").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn public_hunts_resolve_with_their_bonuses() {
        let (public, db) = setup();
        db.create_hunt(new_hunt(1, "visible", "the-token", true))
            .await
            .unwrap();

        let (hunt, bonuses) = public.hunt_by_token("the-token").await.unwrap();
        assert_eq!(hunt.title, "visible");
        assert!(bonuses.is_empty());
    }

    #[tokio::test]
    async fn latest_hunt_is_deterministic_and_scopable() {
        let (public, db) = setup();
        db.create_hunt(new_hunt(1, "older", "a", true)).await.unwrap();
        db.create_hunt(new_hunt(1, "newer", "b", true)).await.unwrap();
        db.create_hunt(new_hunt(2, "other owner", "c", true))
            .await
            .unwrap();

        let (latest, _) = public.latest_hunt(None).await.unwrap();
        assert_eq!(latest.title, "other owner");

        let (latest, _) = public.latest_hunt(Some(1)).await.unwrap();
        assert_eq!(latest.title, "newer");
    }

    #[tokio::test]
    async fn live_list_only_shows_public_hunts() {
        let (public, db) = setup();
        db.create_hunt(new_hunt(1, "on stream", "a", true)).await.unwrap();
        db.create_hunt(new_hunt(1, "off stream", "b", false))
            .await
            .unwrap();

        let live = public.list_live(None).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].hunt.title, "on stream");
        // No user rows exist in this test, the join falls back
        assert_eq!(live[0].owner_name, "Unknown");
    }

    #[tokio::test]
    async fn toggling_public_revokes_token_access() {
        let (public, db) = setup();
        let hunt = db
            .create_hunt(new_hunt(1, "soon private", "t", true))
            .await
            .unwrap();

        assert!(public.hunt_by_token("t").await.is_ok());

        db.update_hunt(UpdatedHunt {
            id: hunt.id,
            is_public: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

        assert!(public.hunt_by_token("t").await.is_err());
    }
}
