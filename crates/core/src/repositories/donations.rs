//! Donation records.

use crate::config::CoreConfig;
use crate::constants::DONATION_FILENAME;
use crate::identifiers::BagNumber;
use crate::models::Donation;
use crate::repositories::store::{create_record_dir, load_all, read_existing, write_yaml};
use crate::uuid::RecordId;
use crate::BloodBankResult;
use bloodbank_types::ComponentType;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DonationRepository {
    cfg: Arc<CoreConfig>,
}

impl DonationRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub fn create(
        &self,
        donor_id: RecordId,
        bag_number: BagNumber,
        component_type: ComponentType,
        volume_ml: u32,
        donated_at: DateTime<Utc>,
    ) -> BloodBankResult<Donation> {
        let (id, dir) = create_record_dir(&self.cfg.donations_dir(), RecordId::new)?;
        let donation = Donation {
            id,
            donor_id,
            bag_number,
            component_type,
            volume_ml,
            donated_at,
        };
        write_yaml(&dir.join(DONATION_FILENAME), &donation)?;
        Ok(donation)
    }

    pub fn get(&self, id: &RecordId) -> BloodBankResult<Donation> {
        let path = id
            .sharded_dir(&self.cfg.donations_dir())
            .join(DONATION_FILENAME);
        read_existing(&path, "donation", &id.to_string())
    }

    /// All donations, most recent first.
    pub fn list(&self) -> Vec<Donation> {
        let mut donations: Vec<Donation> =
            load_all(&self.cfg.donations_dir(), DONATION_FILENAME, 3);
        donations.sort_by(|a, b| b.donated_at.cmp(&a.donated_at));
        donations
    }

    /// A donor's donation history, most recent first.
    pub fn list_for_donor(&self, donor_id: &RecordId) -> Vec<Donation> {
        self.list()
            .into_iter()
            .filter(|d| &d.donor_id == donor_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_history_is_per_donor_and_newest_first() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf(), "test-facility".into()).unwrap();
        let repo = DonationRepository::new(Arc::new(cfg));

        let donor = RecordId::new();
        let other = RecordId::new();
        let now = Utc::now();
        let bag = |s: &str| BagNumber::parse(s).unwrap();

        let old = repo
            .create(donor, bag("BB-20240101-AAAAAA"), ComponentType::WholeBlood, 450, now - Duration::days(90))
            .unwrap();
        let recent = repo
            .create(donor, bag("BB-20240401-BBBBBB"), ComponentType::WholeBlood, 450, now)
            .unwrap();
        repo.create(other, bag("BB-20240401-CCCCCC"), ComponentType::Platelets, 250, now)
            .unwrap();

        let history: Vec<_> = repo.list_for_donor(&donor).into_iter().map(|d| d.id).collect();
        assert_eq!(history, vec![recent.id, old.id]);
        assert_eq!(repo.get(&old.id).unwrap(), old);
    }
}
