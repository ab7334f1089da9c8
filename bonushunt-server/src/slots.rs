use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    serialized::{Slot, ToSerialized},
    Router,
};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/slots/search",
    tag = "slots",
    params(
        ("q" = Option<String>, Query, description = "Substring to search slot names for")
    ),
    responses(
        (status = 200, body = Vec<Slot>)
    )
)]
async fn search_slots(
    State(context): State<ServerContext>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<Vec<Slot>>> {
    let query = query.q.unwrap_or_default();

    // Too short to be a useful autocomplete query
    if query.len() < 2 {
        return Ok(Json(vec![]));
    }

    let slots = context.tracker.slots.search(&query).await?;

    Ok(Json(slots.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/slots/{name}",
    tag = "slots",
    responses(
        (status = 200, body = Slot),
        (status = 404, description = "No slot with this name")
    )
)]
async fn slot_by_name(
    State(context): State<ServerContext>,
    Path(name): Path<String>,
) -> ServerResult<Json<Slot>> {
    let slot = context.tracker.slots.by_name(&name).await?;

    Ok(Json(slot.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/slots/search", get(search_slots))
        .route("/slots/:name", get(slot_by_name))
}
