//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services as an
//! `Arc<CoreConfig>`. Request handling never reads process-wide environment variables, which keeps
//! behaviour consistent across multi-threaded runtimes and test harnesses.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_FACILITY, DONATIONS_DIR_NAME, DONORS_DIR_NAME, INVENTORY_DIR_NAME,
    REQUESTS_DIR_NAME, TRANSFUSIONS_DIR_NAME,
};
use crate::{BloodBankError, BloodBankResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    facility: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Root directory holding every blood bank collection.
    /// * `facility` - Label of the facility operating this blood bank.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::InvalidInput`] if `facility` is empty or contains characters
    /// outside `[A-Za-z0-9._-]`.
    pub fn new(data_dir: PathBuf, facility: String) -> BloodBankResult<Self> {
        validate_facility(&facility)?;
        Ok(Self { data_dir, facility })
    }

    /// Builds a configuration from optional raw values, applying the defaults.
    ///
    /// Binaries read `BLOODBANK_DATA_DIR` and `BLOODBANK_FACILITY` and pass them here.
    pub fn from_values(
        data_dir: Option<String>,
        facility: Option<String>,
    ) -> BloodBankResult<Self> {
        let data_dir = data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let facility = facility
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FACILITY.into());
        Self::new(PathBuf::from(data_dir), facility)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    pub fn donors_dir(&self) -> PathBuf {
        self.data_dir.join(DONORS_DIR_NAME)
    }

    pub fn inventory_dir(&self) -> PathBuf {
        self.data_dir.join(INVENTORY_DIR_NAME)
    }

    pub fn donations_dir(&self) -> PathBuf {
        self.data_dir.join(DONATIONS_DIR_NAME)
    }

    pub fn requests_dir(&self) -> PathBuf {
        self.data_dir.join(REQUESTS_DIR_NAME)
    }

    pub fn transfusions_dir(&self) -> PathBuf {
        self.data_dir.join(TRANSFUSIONS_DIR_NAME)
    }

    /// Creates the data directory and every collection directory beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::StorageDirCreation`] if any directory cannot be created.
    pub fn ensure_layout(&self) -> BloodBankResult<()> {
        for dir in [
            self.donors_dir(),
            self.inventory_dir(),
            self.donations_dir(),
            self.requests_dir(),
            self.transfusions_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(BloodBankError::StorageDirCreation)?;
        }
        Ok(())
    }
}

fn validate_facility(facility: &str) -> BloodBankResult<()> {
    const MAX_FACILITY_LEN: usize = 253;

    if facility.trim().is_empty() {
        return Err(BloodBankError::InvalidInput(
            "facility cannot be empty".into(),
        ));
    }

    if facility.len() > MAX_FACILITY_LEN {
        return Err(BloodBankError::InvalidInput(format!(
            "facility exceeds maximum length of {} characters",
            MAX_FACILITY_LEN
        )));
    }

    let ok = facility
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));
    if !ok {
        return Err(BloodBankError::InvalidInput(
            "facility contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_rejects_empty_facility() {
        let err = CoreConfig::new(PathBuf::from("data"), "  ".into()).unwrap_err();
        assert!(matches!(err, BloodBankError::InvalidInput(_)));
    }

    #[test]
    fn test_new_rejects_facility_with_slash() {
        assert!(CoreConfig::new(PathBuf::from("data"), "st/marys".into()).is_err());
    }

    #[test]
    fn test_from_values_applies_defaults() {
        let cfg = CoreConfig::from_values(None, Some("   ".into())).unwrap();
        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        assert_eq!(cfg.facility(), DEFAULT_FACILITY);
    }

    #[test]
    fn test_collection_dirs_live_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/bb"), "st-marys".into()).unwrap();
        assert_eq!(cfg.inventory_dir(), PathBuf::from("/srv/bb/inventory"));
        assert_eq!(cfg.donors_dir(), PathBuf::from("/srv/bb/donors"));
    }

    #[test]
    fn test_ensure_layout_creates_collections() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("bb"), "st-marys".into()).unwrap();
        cfg.ensure_layout().unwrap();

        assert!(cfg.donors_dir().is_dir());
        assert!(cfg.inventory_dir().is_dir());
        assert!(cfg.donations_dir().is_dir());
        assert!(cfg.requests_dir().is_dir());
        assert!(cfg.transfusions_dir().is_dir());
    }
}
