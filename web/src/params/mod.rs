//! This module holds typed parameters for various endpoint inputs.
//!
//! By using typed parameters we ensure that endpoint inputs are validated
//! (by type) and correctly formatted before they are processed by the
//! application logic, and that the OpenAPI spec documents them accurately.

pub(crate) mod recipe;
pub(crate) mod wiki;
