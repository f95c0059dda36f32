use axum::extract::Path;
use axum::response::IntoResponse;
use log::*;

use crate::controller::not_implemented;
use crate::params::wiki::PagePath;

/// GET the rendered wiki page for direct browser loads
#[utoipa::path(
    get,
    path = "/wiki/{page}",
    params(PagePath),
    responses(
        (status = 501, description = "Wiki page rendering is not implemented")
    )
)]
pub async fn read(Path(params): Path<PagePath>) -> impl IntoResponse {
    debug!("GET wiki page '{}'", params.page);
    not_implemented()
}
