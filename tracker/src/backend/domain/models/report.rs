use chrono::NaiveDate;

use super::class::ClassNumber;

/// `count / total * 100`, or 0 when there is nothing to divide by
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub total_records: usize,
    pub present_count: usize,
    pub absent_count: usize,
}

impl ReportCounts {
    pub fn present_percent(&self) -> f64 {
        percentage(self.present_count, self.total_records)
    }

    pub fn absent_percent(&self) -> f64 {
        percentage(self.absent_count, self.total_records)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentAttendanceSummary {
    pub student_id: String,
    /// Empty when the ID is in the log but no longer on the roster
    pub name: String,
    pub present_count: usize,
    pub absent_count: usize,
}

impl StudentAttendanceSummary {
    pub fn present_percent(&self) -> f64 {
        percentage(self.present_count, self.present_count + self.absent_count)
    }
}

/// The three outcomes a report screen distinguishes
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    NoLogFile,
    NoRecordsInRange,
    Records {
        counts: ReportCounts,
        students: Vec<StudentAttendanceSummary>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportStats {
    pub class_num: ClassNumber,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub outcome: ReportOutcome,
}

impl ReportStats {
    pub fn counts(&self) -> Option<&ReportCounts> {
        match &self.outcome {
            ReportOutcome::Records { counts, .. } => Some(counts),
            _ => None,
        }
    }
}
