use serde::Deserialize;
use utoipa::IntoParams;

/// Path parameters for `/wiki/{page}`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub(crate) struct PagePath {
    /// Wiki page name
    pub(crate) page: String,
}
