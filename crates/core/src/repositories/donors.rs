//! Donor records.

use crate::config::CoreConfig;
use crate::constants::DONOR_FILENAME;
use crate::models::Donor;
use crate::repositories::store::{create_record_dir, load_all, read_existing, write_yaml};
use crate::uuid::RecordId;
use crate::BloodBankResult;
use bloodbank_types::{BloodType, NonEmptyText};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DonorRepository {
    cfg: Arc<CoreConfig>,
}

impl DonorRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.cfg.donors_dir()).join(DONOR_FILENAME)
    }

    /// Registers a new donor under a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record directory cannot be allocated or the file cannot be
    /// written.
    pub fn create(
        &self,
        name: NonEmptyText,
        blood_type: BloodType,
        last_donation_date: Option<DateTime<Utc>>,
        contact: Option<String>,
    ) -> BloodBankResult<Donor> {
        let (id, dir) = create_record_dir(&self.cfg.donors_dir(), RecordId::new)?;
        let donor = Donor {
            id,
            name,
            blood_type,
            last_donation_date,
            contact: contact.filter(|c| !c.trim().is_empty()),
            registered_at: Utc::now(),
        };
        write_yaml(&dir.join(DONOR_FILENAME), &donor)?;
        tracing::info!(donor_id = %donor.id, blood_type = %donor.blood_type, "registered donor");
        Ok(donor)
    }

    pub fn get(&self, id: &RecordId) -> BloodBankResult<Donor> {
        read_existing(&self.record_path(id), "donor", &id.to_string())
    }

    /// Overwrites an existing donor record.
    pub fn update(&self, donor: &Donor) -> BloodBankResult<()> {
        let path = self.record_path(&donor.id);
        read_existing::<Donor>(&path, "donor", &donor.id.to_string())?;
        write_yaml(&path, donor)
    }

    /// All donors, ordered by name.
    pub fn list(&self) -> Vec<Donor> {
        let mut donors: Vec<Donor> = load_all(&self.cfg.donors_dir(), DONOR_FILENAME, 3);
        donors.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        donors
    }

    pub fn list_by_blood_type(&self, blood_type: BloodType) -> Vec<Donor> {
        self.list()
            .into_iter()
            .filter(|d| d.blood_type == blood_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BloodBankError;
    use tempfile::TempDir;

    fn repo(temp: &TempDir) -> DonorRepository {
        let cfg = CoreConfig::new(temp.path().to_path_buf(), "test-facility".into()).unwrap();
        DonorRepository::new(Arc::new(cfg))
    }

    #[test]
    fn test_create_and_get_donor() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);

        let donor = repo
            .create(
                NonEmptyText::new("Ada Lovelace").unwrap(),
                BloodType::ONegative,
                None,
                Some("  ".into()),
            )
            .unwrap();

        let loaded = repo.get(&donor.id).unwrap();
        assert_eq!(loaded, donor);
        assert_eq!(loaded.contact, None);
        assert!(donor
            .id
            .sharded_dir(&temp.path().join("donors"))
            .join("donor.yaml")
            .is_file());
    }

    #[test]
    fn test_get_unknown_donor_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = repo(&temp).get(&RecordId::new());
        assert!(matches!(result, Err(BloodBankError::NotFound { kind: "donor", .. })));
    }

    #[test]
    fn test_update_persists_last_donation() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let mut donor = repo
            .create(NonEmptyText::new("Bo").unwrap(), BloodType::APositive, None, None)
            .unwrap();

        let when = Utc::now();
        donor.last_donation_date = Some(when);
        repo.update(&donor).unwrap();

        assert_eq!(repo.get(&donor.id).unwrap().last_donation_date, Some(when));
    }

    #[test]
    fn test_update_unknown_donor_fails() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let donor = Donor {
            id: RecordId::new(),
            name: NonEmptyText::new("Ghost").unwrap(),
            blood_type: BloodType::BPositive,
            last_donation_date: None,
            contact: None,
            registered_at: Utc::now(),
        };
        assert!(matches!(repo.update(&donor), Err(BloodBankError::NotFound { .. })));
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        for (name, bt) in [
            ("Zoe", BloodType::OPositive),
            ("Amir", BloodType::OPositive),
            ("Mei", BloodType::ABNegative),
        ] {
            repo.create(NonEmptyText::new(name).unwrap(), bt, None, None)
                .unwrap();
        }

        let names: Vec<_> = repo.list().into_iter().map(|d| d.name.to_string()).collect();
        assert_eq!(names, vec!["Amir", "Mei", "Zoe"]);
        assert_eq!(repo.list_by_blood_type(BloodType::OPositive).len(), 2);
    }
}
