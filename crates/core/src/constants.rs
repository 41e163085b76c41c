//! Constants used throughout the blood bank core crate.
//!
//! Storage layout names live here so that repositories, tests and tooling agree on where each
//! collection is written.

/// Default directory for blood bank data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "blood_bank_data";

/// Default facility label used when none is configured.
pub const DEFAULT_FACILITY: &str = "bloodbank.dev.1";

/// Directory name for donor records.
pub const DONORS_DIR_NAME: &str = "donors";

/// Directory name for blood units, keyed by bag number.
pub const INVENTORY_DIR_NAME: &str = "inventory";

/// Directory name for donation records.
pub const DONATIONS_DIR_NAME: &str = "donations";

/// Directory name for transfusion requests.
pub const REQUESTS_DIR_NAME: &str = "requests";

/// Directory name for transfusion records.
pub const TRANSFUSIONS_DIR_NAME: &str = "transfusions";

pub const DONOR_FILENAME: &str = "donor.yaml";
pub const UNIT_FILENAME: &str = "unit.yaml";
pub const DONATION_FILENAME: &str = "donation.yaml";
pub const REQUEST_FILENAME: &str = "request.yaml";
pub const TRANSFUSION_FILENAME: &str = "transfusion.yaml";

/// Number of times a storage allocation (record directory or bag number) is retried.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;
