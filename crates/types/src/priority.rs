use crate::{label_serde, TypeError};
use std::str::FromStr;

/// Clinical urgency of a transfusion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Routine,
    Urgent,
    Emergency,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Routine,
        Priority::Urgent,
        Priority::Emergency,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Routine => "routine",
            Priority::Urgent => "urgent",
            Priority::Emergency => "emergency",
            Priority::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == normalised)
            .ok_or_else(|| TypeError::UnknownPriority(s.to_owned()))
    }
}

label_serde!(Priority);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering_follows_urgency() {
        assert!(Priority::Routine < Priority::Urgent);
        assert!(Priority::Emergency < Priority::Critical);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
        assert!("unknown-value".parse::<Priority>().is_err());
    }
}
