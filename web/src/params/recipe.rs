use serde::Deserialize;
use utoipa::IntoParams;

/// Path parameters for recipe-scoped endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub(crate) struct RecipePath {
    /// Recipe name
    pub(crate) recipe: String,
}

/// Path parameters for tiddler endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub(crate) struct TiddlerPath {
    /// Recipe name
    pub(crate) recipe: String,
    /// Tiddler title
    pub(crate) tiddler: String,
}
