pub mod attendance;
pub mod class;
pub mod report;
pub mod student;

pub use attendance::{AttendanceEvent, AttendanceStatus};
pub use class::ClassNumber;
pub use report::{ReportCounts, ReportOutcome, ReportStats, StudentAttendanceSummary};
pub use student::{Student, StudentDetails};
