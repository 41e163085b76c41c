//! # API Shared
//!
//! Shared wire definitions for the blood bank APIs.
//!
//! Contains:
//! - Request/response bodies (`wire` module), deriving serde and `utoipa::ToSchema`
//! - Shared services like `HealthService`
//!
//! Blood types, components and priorities travel as their canonical labels (`"O-"`,
//! `"packed_rbc"`, `"urgent"`) so that handlers can apply lenient or strict parsing as each
//! endpoint requires.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
