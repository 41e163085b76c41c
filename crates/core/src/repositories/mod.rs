//! File-backed data-access layer.
//!
//! Each collection lives in its own directory under the configured data dir, one YAML file per
//! record:
//!
//! ```text
//! <data_dir>/
//!   donors/<s1>/<s2>/<id>/donor.yaml
//!   donations/<s1>/<s2>/<id>/donation.yaml
//!   inventory/<bag_number>/unit.yaml
//!   requests/<s1>/<s2>/<id>/request.yaml
//!   transfusions/<s1>/<s2>/<id>/transfusion.yaml
//! ```
//!
//! Repositories only read and write records. Compatibility and eligibility gates belong to
//! [`crate::workflows`].

pub mod donations;
pub mod donors;
pub mod inventory;
pub mod requests;
pub(crate) mod store;
pub mod transfusions;
