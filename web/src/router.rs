use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::changes;
use crate::controller::{health_check_controller, tiddler_controller, wiki_controller};
use crate::AppState;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "TiddlyWeb Server API"
        ),
        paths(
            health_check_controller::health_check,
            wiki_controller::read,
            tiddler_controller::index,
            tiddler_controller::read,
            tiddler_controller::update,
            tiddler_controller::delete,
        ),
        tags(
            (name = "tiddlyweb", description = "Wiki recipe & tiddler content API with live change streaming")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(wiki_routes(app_state.clone()))
        .merge(tiddler_routes(app_state.clone()))
        .merge(changes_routes(app_state.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes(&app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn wiki_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/wiki/:page", get(wiki_controller::read))
        .with_state(app_state)
}

fn tiddler_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/recipes/:recipe/tiddlers.json",
            get(tiddler_controller::index),
        )
        .route(
            "/recipes/:recipe/tiddlers/:tiddler",
            get(tiddler_controller::read),
        )
        .route(
            "/recipes/:recipe/tiddlers/:tiddler",
            put(tiddler_controller::update),
        )
        .route(
            "/recipes/:recipe/tiddlers/:tiddler",
            delete(tiddler_controller::delete),
        )
        .with_state(app_state)
}

fn changes_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/recipes/:recipe/changes",
            get(changes::handler::recipe_changes),
        )
        .with_state(app_state)
}

fn static_routes(app_state: &AppState) -> ServeDir {
    ServeDir::new(&app_state.config.static_dir)
}
