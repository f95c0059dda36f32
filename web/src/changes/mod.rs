//! HTTP handler for the live changes feed.
//!
//! This module contains only the Axum handler for the changes endpoint.
//! The core SSE infrastructure (Channel, UpdateSource, ConnectionRegistry)
//! lives in the `sse` crate to avoid circular dependencies.

pub mod handler;
