//! HTTP layer for the carrier registry
//!
//! Request normalization lives in `params`; route handlers in `handlers`.

pub mod handlers;
pub mod params;
