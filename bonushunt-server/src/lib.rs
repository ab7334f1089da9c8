use axum::routing::get;
use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod auth;
mod context;
mod docs;
mod errors;
mod hunts;
mod public;
mod schemas;
mod serialized;
mod slots;

pub mod logging;

pub use context::ServerContext;
pub use errors::{ServerError, ServerResult};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9070;

pub type Router = axum::Router<ServerContext>;

/// Starts the bonushunt server
pub async fn run_server(context: ServerContext) {
    let port = env::var("BONUSHUNT_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .merge(hunts::router())
        .merge(public::router())
        .merge(slots::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    log::info!("Listening on port {port}");

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs");
}
