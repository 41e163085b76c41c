use bloodbank_types::{BloodType, ComponentType, TextError, TypeError};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum BloodBankError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialise YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("record schema mismatch in {} at {}: {}", .path.display(), .location, .message)]
    YamlDeserialization {
        path: std::path::PathBuf,
        location: String,
        message: String,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("failed to allocate a unique bag number after {0} attempts")]
    BagNumberExhausted(usize),

    #[error("donor {donor_id} is not eligible to donate until {next_eligible}")]
    DonorIneligible {
        donor_id: String,
        next_eligible: DateTime<Utc>,
    },
    #[error("{donor} {component} cannot be given to a {recipient} recipient")]
    Incompatible {
        recipient: BloodType,
        donor: BloodType,
        component: ComponentType,
    },
    #[error("request needs {requested} but unit is {actual}")]
    ComponentMismatch {
        requested: ComponentType,
        actual: ComponentType,
    },
    #[error("unit {bag_number} is {status} and cannot be used")]
    UnitUnavailable { bag_number: String, status: String },
    #[error("unit {bag_number} expired at {expiry}")]
    UnitExpired {
        bag_number: String,
        expiry: DateTime<Utc>,
    },
    #[error("request {request_id} is {status}")]
    RequestClosed { request_id: String, status: String },
    #[error("request {request_id} already has all {units_requested} unit(s) reserved or issued")]
    RequestFullyAllocated {
        request_id: String,
        units_requested: u32,
    },
}

impl BloodBankError {
    /// True for refusals raised by a workflow gate rather than by storage or input parsing.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BloodBankError::Incompatible { .. }
                | BloodBankError::ComponentMismatch { .. }
                | BloodBankError::UnitUnavailable { .. }
                | BloodBankError::UnitExpired { .. }
                | BloodBankError::RequestClosed { .. }
                | BloodBankError::RequestFullyAllocated { .. }
        )
    }
}

pub type BloodBankResult<T> = std::result::Result<T, BloodBankError>;
