use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::class::ClassNumber;

/// Storage format for dates. Parsing also accepts non-zero-padded input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

/// One row of the attendance log. Events are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub date: NaiveDate,
    pub class_num: ClassNumber,
    pub student_id: String,
    pub status: AttendanceStatus,
    /// Free text explaining an absence, empty when present
    pub reason: String,
}

impl AttendanceEvent {
    pub fn new(
        date: NaiveDate,
        class_num: ClassNumber,
        student_id: impl Into<String>,
        status: AttendanceStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            date,
            class_num,
            student_id: student_id.into(),
            status,
            reason: reason.into(),
        }
    }

    fn key(&self) -> (NaiveDate, ClassNumber, &str) {
        (self.date, self.class_num, self.student_id.as_str())
    }
}

/// Collapse repeated marks for the same (date, class, student), keeping the
/// row logged last. Survivors keep their relative log order.
pub fn latest_per_key<'a, I>(events: I) -> Vec<&'a AttendanceEvent>
where
    I: IntoIterator<Item = &'a AttendanceEvent>,
{
    let events: Vec<&AttendanceEvent> = events.into_iter().collect();
    let mut last_index: HashMap<(NaiveDate, ClassNumber, &str), usize> = HashMap::new();
    for (index, event) in events.iter().enumerate() {
        last_index.insert(event.key(), index);
    }

    events
        .iter()
        .enumerate()
        .filter(|(index, event)| last_index.get(&event.key()) == Some(index))
        .map(|(_, event)| *event)
        .collect()
}
