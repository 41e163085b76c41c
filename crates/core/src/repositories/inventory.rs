//! Blood unit inventory.
//!
//! Units are stored by bag number rather than by UUID:
//!
//! ```text
//! inventory/
//!   BB-20240101-7Q2XK9/
//!     unit.yaml
//! ```
//!
//! Creating the bag directory is exclusive, which makes the filesystem the uniqueness constraint
//! on bag numbers. A collision draws a fresh number and retries.

use crate::config::CoreConfig;
use crate::constants::{MAX_ALLOCATION_ATTEMPTS, UNIT_FILENAME};
use crate::identifiers::{generate_bag_number, BagNumber};
use crate::lifecycle::{calculate_expiry_date, is_expired_at};
use crate::models::{BloodUnit, UnitStatus};
use crate::repositories::store::{load_all, read_existing, write_yaml};
use crate::uuid::RecordId;
use crate::{BloodBankError, BloodBankResult};
use bloodbank_types::{BloodType, ComponentType};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed to take a unit into inventory; the bag number and expiry are derived.
#[derive(Clone, Debug)]
pub struct NewUnit {
    pub blood_type: BloodType,
    pub component_type: ComponentType,
    pub collection_date: DateTime<Utc>,
    pub donor_id: Option<RecordId>,
    pub volume_ml: u32,
}

/// Count of usable units for one blood type and component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockLevel {
    pub blood_type: BloodType,
    pub component_type: ComponentType,
    pub units: usize,
    pub total_volume_ml: u64,
}

#[derive(Clone, Debug)]
pub struct InventoryRepository {
    cfg: Arc<CoreConfig>,
}

impl InventoryRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn unit_path(&self, bag_number: &BagNumber) -> PathBuf {
        self.cfg
            .inventory_dir()
            .join(bag_number.as_str())
            .join(UNIT_FILENAME)
    }

    /// Takes a new unit into inventory as `Available`.
    ///
    /// Generates the bag number and computes the expiry date from the collection date and
    /// component.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::BagNumberExhausted`] if every generated bag number is already
    /// taken, or a storage error if the unit cannot be written.
    pub fn insert_new(&self, new_unit: NewUnit) -> BloodBankResult<BloodUnit> {
        self.insert_new_with(new_unit, generate_bag_number)
    }

    /// [`insert_new`](Self::insert_new) with an explicit bag number source.
    pub fn insert_new_with(
        &self,
        new_unit: NewUnit,
        mut bag_source: impl FnMut() -> BagNumber,
    ) -> BloodBankResult<BloodUnit> {
        let expiry_date = calculate_expiry_date(new_unit.collection_date, new_unit.component_type);
        if expiry_date <= new_unit.collection_date {
            return Err(BloodBankError::InvalidInput(format!(
                "collection_date {} leaves no shelf life",
                new_unit.collection_date
            )));
        }

        let inventory_dir = self.cfg.inventory_dir();
        fs::create_dir_all(&inventory_dir).map_err(BloodBankError::StorageDirCreation)?;

        for _attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let bag_number = bag_source();
            let unit_dir = inventory_dir.join(bag_number.as_str());

            match fs::create_dir(&unit_dir) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(%bag_number, "bag number collision, drawing another");
                    continue;
                }
                Err(e) => return Err(BloodBankError::StorageDirCreation(e)),
            }

            let unit = BloodUnit {
                expiry_date,
                bag_number,
                blood_type: new_unit.blood_type,
                component_type: new_unit.component_type,
                collection_date: new_unit.collection_date,
                status: UnitStatus::Available,
                donor_id: new_unit.donor_id,
                volume_ml: new_unit.volume_ml,
                reserved_for: None,
                updated_at: Utc::now(),
            };
            if let Err(e) = write_yaml(&unit_dir.join(UNIT_FILENAME), &unit) {
                if let Err(cleanup) = fs::remove_dir_all(&unit_dir) {
                    tracing::error!(
                        bag_number = %unit.bag_number,
                        "failed to remove partial unit directory: {}",
                        cleanup
                    );
                }
                return Err(e);
            }

            tracing::info!(
                bag_number = %unit.bag_number,
                blood_type = %unit.blood_type,
                component = %unit.component_type,
                expiry = %unit.expiry_date,
                "unit added to inventory"
            );
            return Ok(unit);
        }

        Err(BloodBankError::BagNumberExhausted(MAX_ALLOCATION_ATTEMPTS))
    }

    pub fn get(&self, bag_number: &BagNumber) -> BloodBankResult<BloodUnit> {
        read_existing(&self.unit_path(bag_number), "unit", bag_number.as_str())
    }

    /// Overwrites an existing unit, stamping `updated_at`.
    pub fn update(&self, unit: &mut BloodUnit) -> BloodBankResult<()> {
        let path = self.unit_path(&unit.bag_number);
        read_existing::<BloodUnit>(&path, "unit", unit.bag_number.as_str())?;
        unit.updated_at = Utc::now();
        write_yaml(&path, unit)
    }

    /// Removes a unit that was taken in by a donation which could not be completed.
    pub(crate) fn remove(&self, bag_number: &BagNumber) -> BloodBankResult<()> {
        let unit_dir = self.cfg.inventory_dir().join(bag_number.as_str());
        fs::remove_dir_all(&unit_dir).map_err(BloodBankError::FileWrite)
    }

    /// All units, ordered by bag number.
    pub fn list(&self) -> Vec<BloodUnit> {
        load_all(&self.cfg.inventory_dir(), UNIT_FILENAME, 1)
    }

    pub fn list_by_status(&self, status: UnitStatus) -> Vec<BloodUnit> {
        self.list()
            .into_iter()
            .filter(|u| u.status == status)
            .collect()
    }

    /// Units still in circulation (available, reserved or issued).
    pub fn list_active(&self) -> Vec<BloodUnit> {
        self.list()
            .into_iter()
            .filter(|u| u.status.is_active())
            .collect()
    }

    /// Units currently reserved for `request_id`.
    pub fn reserved_for(&self, request_id: &RecordId) -> Vec<BloodUnit> {
        self.list_by_status(UnitStatus::Reserved)
            .into_iter()
            .filter(|u| u.reserved_for.as_ref() == Some(request_id))
            .collect()
    }

    /// Units that are `Available` and not expired at `now`, earliest expiry first.
    pub fn available_units(&self, now: DateTime<Utc>) -> Vec<BloodUnit> {
        let mut units: Vec<BloodUnit> = self
            .list_by_status(UnitStatus::Available)
            .into_iter()
            .filter(|u| !is_expired_at(u.expiry_date, now))
            .collect();
        units.sort_by_key(|u| u.expiry_date);
        units
    }

    /// Usable stock grouped by blood type and component.
    pub fn summary(&self, now: DateTime<Utc>) -> Vec<StockLevel> {
        let mut levels: BTreeMap<(BloodType, ComponentType), StockLevel> = BTreeMap::new();
        for unit in self.available_units(now) {
            let level = levels
                .entry((unit.blood_type, unit.component_type))
                .or_insert_with(|| StockLevel {
                    blood_type: unit.blood_type,
                    component_type: unit.component_type,
                    units: 0,
                    total_volume_ml: 0,
                });
            level.units += 1;
            level.total_volume_ml += u64::from(unit.volume_ml);
        }
        levels.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn repo(temp: &TempDir) -> InventoryRepository {
        let cfg = CoreConfig::new(temp.path().to_path_buf(), "test-facility".into()).unwrap();
        InventoryRepository::new(Arc::new(cfg))
    }

    fn new_unit(blood_type: BloodType, component: ComponentType, collected: DateTime<Utc>) -> NewUnit {
        NewUnit {
            blood_type,
            component_type: component,
            collection_date: collected,
            donor_id: None,
            volume_ml: 450,
        }
    }

    #[test]
    fn test_insert_new_computes_expiry_and_bag_number() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let collected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let unit = repo
            .insert_new(new_unit(BloodType::APositive, ComponentType::PackedRbc, collected))
            .unwrap();

        assert!(BagNumber::is_well_formed(unit.bag_number.as_str()));
        assert_eq!(
            unit.expiry_date,
            Utc.with_ymd_and_hms(2024, 2, 12, 0, 0, 0).unwrap()
        );
        assert_eq!(unit.status, UnitStatus::Available);
        assert_eq!(repo.get(&unit.bag_number).unwrap(), unit);
    }

    #[test]
    fn test_insert_retries_on_bag_collision() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let taken = BagNumber::parse("BB-20240101-AAAAAA").unwrap();
        let fresh = BagNumber::parse("BB-20240101-BBBBBB").unwrap();
        fs::create_dir_all(temp.path().join("inventory").join(taken.as_str())).unwrap();

        let mut bags = vec![fresh.clone(), taken].into_iter().rev();
        let unit = repo
            .insert_new_with(
                new_unit(BloodType::ONegative, ComponentType::WholeBlood, Utc::now()),
                || bags.next().unwrap(),
            )
            .unwrap();

        assert_eq!(unit.bag_number, fresh);
    }

    #[test]
    fn test_insert_gives_up_when_every_bag_collides() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let taken = BagNumber::parse("BB-20240101-AAAAAA").unwrap();
        fs::create_dir_all(temp.path().join("inventory").join(taken.as_str())).unwrap();

        let result = repo.insert_new_with(
            new_unit(BloodType::ONegative, ComponentType::WholeBlood, Utc::now()),
            || taken.clone(),
        );
        assert!(matches!(result, Err(BloodBankError::BagNumberExhausted(5))));
    }

    #[test]
    fn test_insert_refuses_collection_without_shelf_life() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);

        let result = repo.insert_new(new_unit(
            BloodType::APositive,
            ComponentType::FreshFrozenPlasma,
            DateTime::<Utc>::MAX_UTC,
        ));

        assert!(matches!(result, Err(BloodBankError::InvalidInput(_))));
        assert!(repo.list().is_empty());
    }

    #[test]
    fn test_remove_deletes_unit_directory() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let unit = repo
            .insert_new(new_unit(BloodType::OPositive, ComponentType::WholeBlood, Utc::now()))
            .unwrap();

        repo.remove(&unit.bag_number).unwrap();

        assert!(!temp.path().join("inventory").join(unit.bag_number.as_str()).exists());
        assert!(matches!(
            repo.get(&unit.bag_number),
            Err(BloodBankError::NotFound { kind: "unit", .. })
        ));
    }

    #[test]
    fn test_list_active_and_reserved_for() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let now = Utc::now();
        let request_id = RecordId::new();

        let available = repo
            .insert_new(new_unit(BloodType::ONegative, ComponentType::PackedRbc, now))
            .unwrap();
        let mut reserved = repo
            .insert_new(new_unit(BloodType::ONegative, ComponentType::PackedRbc, now))
            .unwrap();
        reserved.status = UnitStatus::Reserved;
        reserved.reserved_for = Some(request_id);
        repo.update(&mut reserved).unwrap();
        let mut discarded = repo
            .insert_new(new_unit(BloodType::ONegative, ComponentType::PackedRbc, now))
            .unwrap();
        discarded.status = UnitStatus::Discarded;
        repo.update(&mut discarded).unwrap();

        let mut active: Vec<_> = repo.list_active().into_iter().map(|u| u.bag_number).collect();
        active.sort();
        let mut expected = vec![available.bag_number, reserved.bag_number.clone()];
        expected.sort();
        assert_eq!(active, expected);

        let held: Vec<_> = repo
            .reserved_for(&request_id)
            .into_iter()
            .map(|u| u.bag_number)
            .collect();
        assert_eq!(held, vec![reserved.bag_number]);
        assert!(repo.reserved_for(&RecordId::new()).is_empty());
    }

    #[test]
    fn test_update_unknown_unit_is_not_found() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let mut unit = BloodUnit {
            bag_number: BagNumber::parse("BB-20240101-ZZZZZZ").unwrap(),
            blood_type: BloodType::BPositive,
            component_type: ComponentType::Platelets,
            collection_date: Utc::now(),
            expiry_date: Utc::now(),
            status: UnitStatus::Available,
            donor_id: None,
            volume_ml: 200,
            reserved_for: None,
            updated_at: Utc::now(),
        };
        assert!(matches!(
            repo.update(&mut unit),
            Err(BloodBankError::NotFound { kind: "unit", .. })
        ));
    }

    #[test]
    fn test_available_units_skip_expired_and_sort_by_expiry() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let now = Utc::now();

        let expired = repo
            .insert_new(new_unit(
                BloodType::OPositive,
                ComponentType::Platelets,
                now - Duration::days(10),
            ))
            .unwrap();
        let later = repo
            .insert_new(new_unit(BloodType::OPositive, ComponentType::PackedRbc, now))
            .unwrap();
        let sooner = repo
            .insert_new(new_unit(BloodType::OPositive, ComponentType::Platelets, now))
            .unwrap();

        let bags: Vec<_> = repo
            .available_units(now)
            .into_iter()
            .map(|u| u.bag_number)
            .collect();
        assert_eq!(bags, vec![sooner.bag_number, later.bag_number]);
        assert!(!bags.contains(&expired.bag_number));
    }

    #[test]
    fn test_summary_groups_usable_stock() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let now = Utc::now();

        for _ in 0..2 {
            repo.insert_new(new_unit(BloodType::ANegative, ComponentType::PackedRbc, now))
                .unwrap();
        }
        let mut issued = repo
            .insert_new(new_unit(BloodType::ANegative, ComponentType::PackedRbc, now))
            .unwrap();
        issued.status = UnitStatus::Issued;
        repo.update(&mut issued).unwrap();
        repo.insert_new(new_unit(BloodType::BPositive, ComponentType::Cryoprecipitate, now))
            .unwrap();

        let summary = repo.summary(now);
        assert_eq!(summary.len(), 2);
        let a_neg = summary
            .iter()
            .find(|l| l.blood_type == BloodType::ANegative)
            .unwrap();
        assert_eq!(a_neg.units, 2);
        assert_eq!(a_neg.total_volume_ml, 900);
    }
}
