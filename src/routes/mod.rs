//! HTTP route handlers grouped by resource.
//!
//! Every handler is annotated with `#[openapi]` so `rocket_okapi` can derive
//! the OpenAPI document served under `/api/v1/openapi.json`.

pub mod connection;
pub mod health;
pub mod recipes;
