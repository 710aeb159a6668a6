use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::backend::domain::errors::{Result, TrackerError};

/// One of the school's fixed classes, numbered 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ClassNumber(u8);

impl ClassNumber {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 8;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::FIRST..=Self::LAST).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TrackerError::validation(format!(
                "Class must be between {} and {}, got {}",
                Self::FIRST,
                Self::LAST,
                value
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All classes in ascending order
    pub fn all() -> impl Iterator<Item = ClassNumber> {
        (Self::FIRST..=Self::LAST).map(ClassNumber)
    }
}

impl fmt::Display for ClassNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for ClassNumber {
    type Error = TrackerError;

    fn try_from(value: u8) -> Result<Self> {
        ClassNumber::new(value)
    }
}

impl From<ClassNumber> for u8 {
    fn from(class_num: ClassNumber) -> u8 {
        class_num.0
    }
}

impl FromStr for ClassNumber {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| TrackerError::validation(format!("Invalid class number: '{}'", s)))?;
        ClassNumber::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_only_one_through_eight() {
        assert!(ClassNumber::new(0).is_err());
        assert!(ClassNumber::new(9).is_err());
        assert_eq!(ClassNumber::new(1).unwrap().get(), 1);
        assert_eq!(ClassNumber::new(8).unwrap().get(), 8);
    }

    #[test]
    fn test_all_lists_eight_classes_in_order() {
        let all: Vec<u8> = ClassNumber::all().map(ClassNumber::get).collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_parse_from_csv_field() {
        assert_eq!(" 3 ".parse::<ClassNumber>().unwrap().get(), 3);
        assert!("three".parse::<ClassNumber>().unwrap_err().is_validation());
        assert!("12".parse::<ClassNumber>().is_err());
    }
}
