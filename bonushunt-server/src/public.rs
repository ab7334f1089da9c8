//! The unauthenticated read surface the overlays poll

use axum::{
    extract::{Path, State},
    routing::get,
    Json,
};
use bonushunt_core::{Database, OverallStats as CoreOverallStats};

use crate::{
    auth::MaybeSession,
    context::ServerContext,
    errors::ServerResult,
    serialized::{HuntWithBonuses, LiveHunt, OverallStats, PublicLink, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/public/{token}",
    tag = "public",
    responses(
        (status = 200, body = HuntWithBonuses),
        (status = 404, description = "No public hunt with this token")
    )
)]
async fn hunt_by_token(
    State(context): State<ServerContext>,
    Path(token): Path<String>,
) -> ServerResult<Json<HuntWithBonuses>> {
    let (hunt, bonuses) = context.tracker.public.hunt_by_token(&token).await?;

    Ok(Json(HuntWithBonuses {
        hunt: hunt.to_serialized(),
        bonuses: bonuses.to_serialized(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/latest-hunt",
    tag = "public",
    responses(
        (status = 200, body = HuntWithBonuses),
        (status = 404, description = "No hunt exists yet")
    )
)]
async fn latest_hunt(
    session: MaybeSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<HuntWithBonuses>> {
    let (hunt, bonuses) = context.tracker.public.latest_hunt(session.owner_id()).await?;

    Ok(Json(HuntWithBonuses {
        hunt: hunt.to_serialized(),
        bonuses: bonuses.to_serialized(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/latest-hunt/public-link",
    tag = "public",
    responses(
        (status = 200, body = PublicLink),
        (status = 404, description = "No hunt exists yet")
    )
)]
async fn latest_hunt_public_link(
    session: MaybeSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<PublicLink>> {
    let (hunt, _) = context.tracker.public.latest_hunt(session.owner_id()).await?;

    Ok(Json(PublicLink {
        hunt_id: hunt.id,
        public_token: hunt.public_token.clone(),
        title: hunt.title.clone(),
        status: hunt.status.as_str().to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/live-hunts",
    tag = "public",
    responses(
        (status = 200, body = Vec<LiveHunt>)
    )
)]
async fn live_hunts(State(context): State<ServerContext>) -> ServerResult<Json<Vec<LiveHunt>>> {
    let hunts = context.tracker.public.list_live(None).await?;

    Ok(Json(hunts.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/stats",
    tag = "public",
    responses(
        (status = 200, body = OverallStats)
    )
)]
async fn stats(
    session: MaybeSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<OverallStats>> {
    let hunts = context
        .tracker
        .database()
        .list_hunts(session.owner_id())
        .await?;

    let stats = CoreOverallStats::compute(&hunts);

    Ok(Json(stats.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/public/:token", get(hunt_by_token))
        .route("/latest-hunt", get(latest_hunt))
        .route("/latest-hunt/public-link", get(latest_hunt_public_link))
        .route("/live-hunts", get(live_hunts))
        .route("/stats", get(stats))
}
