//! Transfusion requests.

use crate::config::CoreConfig;
use crate::constants::REQUEST_FILENAME;
use crate::models::{RequestStatus, TransfusionRequest};
use crate::repositories::store::{create_record_dir, load_all, read_existing, write_yaml};
use crate::uuid::RecordId;
use crate::{BloodBankError, BloodBankResult};
use bloodbank_types::{BloodType, ComponentType, NonEmptyText, Priority};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

/// Intake form for a transfusion request.
#[derive(Clone, Debug)]
pub struct NewRequest {
    pub patient_ref: NonEmptyText,
    pub recipient_blood_type: BloodType,
    pub component_type: ComponentType,
    pub units_requested: u32,
    pub priority: Priority,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RequestRepository {
    cfg: Arc<CoreConfig>,
}

impl RequestRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.cfg.requests_dir()).join(REQUEST_FILENAME)
    }

    /// Stores a new `Pending` request.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::InvalidInput`] if no units are requested, or a storage error.
    pub fn create(&self, new_request: NewRequest) -> BloodBankResult<TransfusionRequest> {
        if new_request.units_requested == 0 {
            return Err(BloodBankError::InvalidInput(
                "units_requested must be at least 1".into(),
            ));
        }

        let (id, dir) = create_record_dir(&self.cfg.requests_dir(), RecordId::new)?;
        let request = TransfusionRequest {
            id,
            patient_ref: new_request.patient_ref,
            recipient_blood_type: new_request.recipient_blood_type,
            component_type: new_request.component_type,
            units_requested: new_request.units_requested,
            units_issued: 0,
            priority: new_request.priority,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            notes: new_request.notes.filter(|n| !n.trim().is_empty()),
        };
        write_yaml(&dir.join(REQUEST_FILENAME), &request)?;
        tracing::info!(
            request_id = %request.id,
            recipient = %request.recipient_blood_type,
            component = %request.component_type,
            priority = %request.priority,
            "transfusion request created"
        );
        Ok(request)
    }

    pub fn get(&self, id: &RecordId) -> BloodBankResult<TransfusionRequest> {
        read_existing(&self.record_path(id), "request", &id.to_string())
    }

    pub fn update(&self, request: &TransfusionRequest) -> BloodBankResult<()> {
        let path = self.record_path(&request.id);
        read_existing::<TransfusionRequest>(&path, "request", &request.id.to_string())?;
        write_yaml(&path, request)
    }

    /// All requests, most urgent first, then oldest first.
    pub fn list(&self) -> Vec<TransfusionRequest> {
        let mut requests: Vec<TransfusionRequest> =
            load_all(&self.cfg.requests_dir(), REQUEST_FILENAME, 3);
        requests.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.requested_at.cmp(&b.requested_at))
        });
        requests
    }

    /// Requests that can still receive units.
    pub fn list_open(&self) -> Vec<TransfusionRequest> {
        self.list()
            .into_iter()
            .filter(|r| r.status.is_open())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo(temp: &TempDir) -> RequestRepository {
        let cfg = CoreConfig::new(temp.path().to_path_buf(), "test-facility".into()).unwrap();
        RequestRepository::new(Arc::new(cfg))
    }

    fn new_request(priority: Priority, units: u32) -> NewRequest {
        NewRequest {
            patient_ref: NonEmptyText::new("MRN-0001").unwrap(),
            recipient_blood_type: BloodType::OPositive,
            component_type: ComponentType::PackedRbc,
            units_requested: units,
            priority,
            notes: None,
        }
    }

    #[test]
    fn test_create_rejects_zero_units() {
        let temp = TempDir::new().unwrap();
        let result = repo(&temp).create(new_request(Priority::Routine, 0));
        assert!(matches!(result, Err(BloodBankError::InvalidInput(_))));
    }

    #[test]
    fn test_create_starts_pending() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let request = repo.create(new_request(Priority::Urgent, 2)).unwrap();

        let loaded = repo.get(&request.id).unwrap();
        assert_eq!(loaded.status, RequestStatus::Pending);
        assert_eq!(loaded.units_issued, 0);
    }

    #[test]
    fn test_list_orders_by_priority() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        repo.create(new_request(Priority::Routine, 1)).unwrap();
        repo.create(new_request(Priority::Critical, 1)).unwrap();
        let mut cancelled = repo.create(new_request(Priority::Urgent, 1)).unwrap();
        cancelled.status = RequestStatus::Cancelled;
        repo.update(&cancelled).unwrap();

        let priorities: Vec<_> = repo.list().into_iter().map(|r| r.priority).collect();
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::Urgent, Priority::Routine]
        );
        assert_eq!(repo.list_open().len(), 2);
    }
}
