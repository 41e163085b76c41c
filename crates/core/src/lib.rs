//! # Blood Bank Core
//!
//! Domain logic for the hospital blood bank.
//!
//! The crate is layered leaves first:
//! - [`compatibility`]: recipient/donor/component compatibility tables and lookups
//! - [`lifecycle`]: expiry dates and donor eligibility
//! - [`identifiers`] and [`presentation`]: bag numbers and UI tokens
//! - [`repositories`]: file-backed records for donors, inventory, donations, requests and
//!   transfusions
//! - [`workflows`]: donation intake, issuance and transfusion, gated on the engines above
//!
//! The first three layers are pure and hold no state; they are safe to call from any thread.
//!
//! **No API concerns**: HTTP servers and CLI parsing belong in `api-rest` and `bloodbank-cli`.

pub mod compatibility;
pub mod config;
pub mod constants;
pub mod error;
pub mod identifiers;
pub mod lifecycle;
pub mod models;
pub mod presentation;
pub mod repositories;
pub mod uuid;
pub mod workflows;

pub use bloodbank_types::{BloodType, ComponentType, NonEmptyText, Priority};
pub use config::CoreConfig;
pub use constants::{DEFAULT_DATA_DIR, DEFAULT_FACILITY};
pub use error::{BloodBankError, BloodBankResult};
pub use identifiers::BagNumber;
pub use uuid::RecordId;
pub use workflows::BloodBankService;
