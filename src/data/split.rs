use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Test,
    Validation,
    Train,
}

impl Subset {
    pub const ALL: [Subset; 3] = [Subset::Test, Subset::Validation, Subset::Train];
}

impl FromStr for Subset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Subset::Test),
            "validation" => Ok(Subset::Validation),
            "train" => Ok(Subset::Train),
            other => Err(ConfigError::InvalidValue {
                key: "subset",
                reason: format!("unknown subset {other}"),
            }),
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subset::Test => write!(f, "test"),
            Subset::Validation => write!(f, "validation"),
            Subset::Train => write!(f, "train"),
        }
    }
}

/// Record ids partitioned into contiguous test, validation and train slices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSplit {
    pub test: Vec<String>,
    pub validation: Vec<String>,
    pub train: Vec<String>,
}

impl RecordSplit {
    /// The first `floor(n * test_ratio)` ids go to test, the next
    /// `floor(n * val_ratio)` to validation and the rest to train. Order is kept.
    pub fn new(ids: &[String], test_ratio: f64, val_ratio: f64) -> Result<Self, ConfigError> {
        let ratio_ok = |ratio: f64| (0.0..=1.0).contains(&ratio);
        if !ratio_ok(test_ratio) {
            return Err(ConfigError::InvalidValue {
                key: "test_ratio",
                reason: format!("{test_ratio} is not within [0, 1]"),
            });
        }
        if !ratio_ok(val_ratio) || test_ratio + val_ratio > 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "val_ratio",
                reason: format!("{val_ratio} with test ratio {test_ratio} exceeds 1"),
            });
        }

        let len = ids.len();
        let test_count = (len as f64 * test_ratio) as usize;
        let val_count = (len as f64 * val_ratio) as usize;
        let val_end = (test_count + val_count).min(len);

        Ok(Self {
            test: ids[..test_count].to_vec(),
            validation: ids[test_count..val_end].to_vec(),
            train: ids[val_end..].to_vec(),
        })
    }

    pub fn get(&self, subset: Subset) -> &[String] {
        match subset {
            Subset::Test => &self.test,
            Subset::Validation => &self.validation,
            Subset::Train => &self.train,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("storm_{i:02}")).collect()
    }

    #[test]
    fn slices_are_contiguous_and_ordered() {
        let ids = ids(10);
        let split = RecordSplit::new(&ids, 0.2, 0.3).unwrap();

        assert_eq!(split.get(Subset::Test), &ids[..2]);
        assert_eq!(split.get(Subset::Validation), &ids[2..5]);
        assert_eq!(split.get(Subset::Train), &ids[5..]);
    }

    #[test]
    fn counts_round_down() {
        let split = RecordSplit::new(&ids(7), 0.2, 0.2).unwrap();

        assert_eq!(split.test.len(), 1);
        assert_eq!(split.validation.len(), 1);
        assert_eq!(split.train.len(), 5);
    }

    #[test]
    fn ratios_over_one_are_rejected() {
        assert!(RecordSplit::new(&ids(4), 0.7, 0.5).is_err());
        assert!(RecordSplit::new(&ids(4), -0.1, 0.5).is_err());
    }

    #[test]
    fn subset_names_round_trip_through_display() {
        for subset in Subset::ALL {
            assert_eq!(subset.to_string().parse::<Subset>().unwrap(), subset);
        }
    }
}
