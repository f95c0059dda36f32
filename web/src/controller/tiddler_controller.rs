//! Tiddler content routes.
//!
//! The content store itself is out of scope, so every handler here is a
//! deliberate 501 stub; the routes and their typed params pin the URL
//! surface the wiki protocol expects (the skinny JSON list plus per-tiddler
//! read/write/delete).

use axum::extract::Path;
use axum::response::IntoResponse;
use log::*;

use crate::controller::not_implemented;
use crate::params::recipe::{RecipePath, TiddlerPath};

/// GET the skinny list of all tiddlers in a recipe
#[utoipa::path(
    get,
    path = "/recipes/{recipe}/tiddlers.json",
    params(RecipePath),
    responses(
        (status = 501, description = "Tiddler listing is not implemented")
    )
)]
pub async fn index(Path(params): Path<RecipePath>) -> impl IntoResponse {
    debug!("GET tiddler list for recipe '{}'", params.recipe);
    not_implemented()
}

/// GET a single tiddler
#[utoipa::path(
    get,
    path = "/recipes/{recipe}/tiddlers/{tiddler}",
    params(TiddlerPath),
    responses(
        (status = 501, description = "Tiddler reads are not implemented")
    )
)]
pub async fn read(Path(params): Path<TiddlerPath>) -> impl IntoResponse {
    debug!(
        "GET tiddler '{}' from recipe '{}'",
        params.tiddler, params.recipe
    );
    not_implemented()
}

/// PUT create or replace a single tiddler
#[utoipa::path(
    put,
    path = "/recipes/{recipe}/tiddlers/{tiddler}",
    params(TiddlerPath),
    responses(
        (status = 501, description = "Tiddler writes are not implemented")
    )
)]
pub async fn update(Path(params): Path<TiddlerPath>) -> impl IntoResponse {
    debug!(
        "PUT tiddler '{}' into recipe '{}'",
        params.tiddler, params.recipe
    );
    not_implemented()
}

/// DELETE a single tiddler
#[utoipa::path(
    delete,
    path = "/recipes/{recipe}/tiddlers/{tiddler}",
    params(TiddlerPath),
    responses(
        (status = 501, description = "Tiddler deletion is not implemented")
    )
)]
pub async fn delete(Path(params): Path<TiddlerPath>) -> impl IntoResponse {
    debug!(
        "DELETE tiddler '{}' from recipe '{}'",
        params.tiddler, params.recipe
    );
    not_implemented()
}
