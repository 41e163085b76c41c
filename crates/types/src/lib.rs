//! Closed vocabularies shared across the blood bank crates.
//!
//! Every value here comes from a fixed clinical enumeration. Strict parsing ([`std::str::FromStr`])
//! rejects anything outside the enumeration; callers sitting on an untyped boundary (REST query
//! strings, CLI arguments) decide for themselves whether to reject or fall back.

/// Errors raised when parsing a label into one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("unknown blood type: '{0}'")]
    UnknownBloodType(String),
    #[error("unknown component type: '{0}'")]
    UnknownComponentType(String),
    #[error("unknown priority: '{0}'")]
    UnknownPriority(String),
}

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Implements label-based serde for a type that has `as_str` and a strict `FromStr`.
macro_rules! label_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse::<$ty>().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

pub(crate) use label_serde;

mod blood_type;
mod component;
mod priority;
mod text;

pub use blood_type::BloodType;
pub use component::ComponentType;
pub use priority::Priority;
pub use text::NonEmptyText;
