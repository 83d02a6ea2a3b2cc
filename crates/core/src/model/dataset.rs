use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("unknown dataset: {0}")]
    Unknown(String),
}

/// Which named dataset backs the item repository.
///
/// The storage key of each variant is fixed; existing stores depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSelector {
    /// Long-running general study base.
    #[default]
    General,
    /// Short list for the current week.
    Weekly,
}

impl DatasetSelector {
    pub const ALL: [DatasetSelector; 2] = [DatasetSelector::General, DatasetSelector::Weekly];

    /// Key used in the store namespace.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            DatasetSelector::General => "juridico",
            DatasetSelector::Weekly => "diario",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DatasetSelector::General => "General study",
            DatasetSelector::Weekly => "Weekly study",
        }
    }

    /// The dataset a switch moves to.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            DatasetSelector::General => DatasetSelector::Weekly,
            DatasetSelector::Weekly => DatasetSelector::General,
        }
    }
}

impl fmt::Display for DatasetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DatasetSelector {
    type Err = DatasetError;

    /// Accepts the storage key or the short CLI name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "juridico" | "general" => Ok(DatasetSelector::General),
            "diario" | "weekly" => Ok(DatasetSelector::Weekly),
            other => Err(DatasetError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_ping_pongs() {
        let start = DatasetSelector::default();
        assert_eq!(start.other().other(), start);
        assert_ne!(start.other(), start);
    }

    #[test]
    fn parses_keys_and_names() {
        for selector in DatasetSelector::ALL {
            assert_eq!(selector.key().parse::<DatasetSelector>().unwrap(), selector);
        }
        assert_eq!("Weekly".parse::<DatasetSelector>().unwrap(), DatasetSelector::Weekly);
        assert!("monthly".parse::<DatasetSelector>().is_err());
    }
}
