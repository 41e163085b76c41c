//! Transfusion records.

use crate::config::CoreConfig;
use crate::constants::TRANSFUSION_FILENAME;
use crate::models::Transfusion;
use crate::repositories::store::{create_record_dir, load_all, read_existing, write_yaml};
use crate::uuid::RecordId;
use crate::BloodBankResult;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct TransfusionRepository {
    cfg: Arc<CoreConfig>,
}

impl TransfusionRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Stores a transfusion, assigning it a fresh id.
    pub fn create(&self, build: impl FnOnce(RecordId) -> Transfusion) -> BloodBankResult<Transfusion> {
        let (id, dir) = create_record_dir(&self.cfg.transfusions_dir(), RecordId::new)?;
        let transfusion = build(id);
        write_yaml(&dir.join(TRANSFUSION_FILENAME), &transfusion)?;
        Ok(transfusion)
    }

    pub fn get(&self, id: &RecordId) -> BloodBankResult<Transfusion> {
        let path = id
            .sharded_dir(&self.cfg.transfusions_dir())
            .join(TRANSFUSION_FILENAME);
        read_existing(&path, "transfusion", &id.to_string())
    }

    pub fn list(&self) -> Vec<Transfusion> {
        let mut transfusions: Vec<Transfusion> =
            load_all(&self.cfg.transfusions_dir(), TRANSFUSION_FILENAME, 3);
        transfusions.sort_by(|a, b| b.transfused_at.cmp(&a.transfused_at));
        transfusions
    }

    pub fn list_for_request(&self, request_id: &RecordId) -> Vec<Transfusion> {
        self.list()
            .into_iter()
            .filter(|t| &t.request_id == request_id)
            .collect()
    }
}
