pub mod attendance_mapper;
pub mod report_mapper;
pub mod student_mapper;

pub use attendance_mapper::AttendanceMapper;
pub use report_mapper::ReportMapper;
pub use student_mapper::StudentMapper;
