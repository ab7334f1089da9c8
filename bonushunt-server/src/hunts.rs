use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json,
};
use bonushunt_core::{HuntDraft, HuntStats as CoreHuntStats, NewBonus, UpdatedBonus, UpdatedHunt};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        NewBonusSchema, NewHuntSchema, PayoutSchema, UpdateBonusSchema, UpdateHuntSchema,
        ValidatedJson,
    },
    serialized::{Bonus, Hunt, HuntStats, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/hunts",
    tag = "hunts",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Hunt>)
    )
)]
async fn list_hunts(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Hunt>>> {
    let hunts = context.tracker.hunts.list_hunts(session.owner_id()).await?;

    Ok(Json(hunts.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/hunts",
    tag = "hunts",
    request_body = NewHuntSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Hunt)
    )
)]
async fn create_hunt(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewHuntSchema>,
) -> ServerResult<Json<Hunt>> {
    let hunt = context
        .tracker
        .hunts
        .create_hunt(HuntDraft {
            owner_id: session.owner_id(),
            title: body.title,
            casino: body.casino,
            currency: body.currency,
            start_balance: body.start_balance,
            notes: body.notes,
            is_public: body.is_public.unwrap_or(true),
        })
        .await?;

    Ok(Json(hunt.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/hunts/{id}",
    tag = "hunts",
    responses(
        (status = 200, body = Hunt),
        (status = 404, description = "Hunt does not exist")
    )
)]
async fn hunt(
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<Json<Hunt>> {
    let hunt = context.tracker.hunts.hunt_by_id(hunt_id).await?;

    Ok(Json(hunt.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/hunts/{id}",
    tag = "hunts",
    request_body = UpdateHuntSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Hunt)
    )
)]
async fn update_hunt(
    session: Session,
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateHuntSchema>,
) -> ServerResult<Json<Hunt>> {
    let hunt = context
        .tracker
        .hunts
        .update_hunt(
            session.owner_id(),
            UpdatedHunt {
                id: hunt_id,
                title: body.title,
                casino: body.casino,
                currency: body.currency,
                start_balance: body.start_balance,
                end_balance: body.end_balance,
                notes: body.notes,
                is_public: body.is_public,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(hunt.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/hunts/{id}",
    tag = "hunts",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Hunt and its bonuses were deleted")
    )
)]
async fn delete_hunt(
    session: Session,
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<()> {
    context
        .tracker
        .hunts
        .delete_hunt(session.owner_id(), hunt_id)
        .await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/hunts/{id}/bonuses",
    tag = "hunts",
    responses(
        (status = 200, body = Vec<Bonus>)
    )
)]
async fn bonuses(
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<Json<Vec<Bonus>>> {
    let bonuses = context.tracker.hunts.bonuses(hunt_id).await?;

    Ok(Json(bonuses.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/hunts/{id}/bonuses",
    tag = "hunts",
    request_body = NewBonusSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Bonus)
    )
)]
async fn add_bonus(
    session: Session,
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<NewBonusSchema>,
) -> ServerResult<Json<Bonus>> {
    let bonus = context
        .tracker
        .hunts
        .add_bonus(
            session.owner_id(),
            NewBonus {
                hunt_id,
                slot_name: body.slot_name,
                provider: body.provider,
                image_url: body.image_url,
                bet_amount: body.bet_amount,
                sort_order: body.sort_order,
            },
        )
        .await?;

    Ok(Json(bonus.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/hunts/{id}/stats",
    tag = "hunts",
    responses(
        (status = 200, body = HuntStats)
    )
)]
async fn hunt_stats(
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<Json<HuntStats>> {
    let hunt = context.tracker.hunts.hunt_by_id(hunt_id).await?;
    let bonuses = context.tracker.hunts.bonuses(hunt_id).await?;

    let stats = CoreHuntStats::compute(&hunt, &bonuses);

    Ok(Json(stats.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/hunts/{id}/start-playing",
    tag = "hunts",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Hunt),
        (status = 400, description = "The hunt has no bonuses to play"),
        (status = 403, description = "Caller does not own this hunt")
    )
)]
async fn start_playing(
    session: Session,
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<Json<Hunt>> {
    let hunt = context
        .tracker
        .hunts
        .start_playing(session.owner_id(), hunt_id)
        .await?;

    Ok(Json(hunt.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/hunts/{id}/stop-playing",
    tag = "hunts",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Hunt)
    )
)]
async fn stop_playing(
    session: Session,
    State(context): State<ServerContext>,
    Path(hunt_id): Path<i32>,
) -> ServerResult<Json<Hunt>> {
    let hunt = context
        .tracker
        .hunts
        .stop_playing(session.owner_id(), hunt_id)
        .await?;

    Ok(Json(hunt.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/bonuses/{id}",
    tag = "hunts",
    request_body = UpdateBonusSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Bonus)
    )
)]
async fn update_bonus(
    session: Session,
    State(context): State<ServerContext>,
    Path(bonus_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateBonusSchema>,
) -> ServerResult<Json<Bonus>> {
    let bonus = context
        .tracker
        .hunts
        .update_bonus(
            session.owner_id(),
            UpdatedBonus {
                id: bonus_id,
                slot_name: body.slot_name,
                provider: body.provider,
                image_url: body.image_url,
                bet_amount: body.bet_amount,
                sort_order: body.sort_order,
            },
        )
        .await?;

    Ok(Json(bonus.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/bonuses/{id}",
    tag = "hunts",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Bonus was deleted")
    )
)]
async fn delete_bonus(
    session: Session,
    State(context): State<ServerContext>,
    Path(bonus_id): Path<i32>,
) -> ServerResult<()> {
    context
        .tracker
        .hunts
        .delete_bonus(session.owner_id(), bonus_id)
        .await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/bonuses/{id}/payout",
    tag = "hunts",
    request_body = PayoutSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Bonus),
        (status = 400, description = "Win amount is negative"),
        (status = 404, description = "Bonus does not exist"),
        (status = 409, description = "Payout was already recorded")
    )
)]
async fn record_payout(
    session: Session,
    State(context): State<ServerContext>,
    Path(bonus_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<PayoutSchema>,
) -> ServerResult<Json<Bonus>> {
    let bonus = context
        .tracker
        .hunts
        .record_payout(session.owner_id(), bonus_id, body.win_amount)
        .await?;

    Ok(Json(bonus.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/hunts", get(list_hunts).post(create_hunt))
        .route("/hunts/:id", get(hunt).put(update_hunt).delete(delete_hunt))
        .route("/hunts/:id/bonuses", get(bonuses).post(add_bonus))
        .route("/hunts/:id/stats", get(hunt_stats))
        .route("/hunts/:id/start-playing", post(start_playing))
        .route("/hunts/:id/stop-playing", post(stop_playing))
        .route("/bonuses/:id", put(update_bonus).delete(delete_bonus))
        .route("/bonuses/:id/payout", post(record_payout))
}
