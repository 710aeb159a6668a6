use crate::backend::domain::commands::attendance::{MarkAttendanceCommand, MarkEntry};
use crate::backend::domain::models::attendance::format_date;
use crate::backend::domain::models::{AttendanceEvent, AttendanceStatus as DomainStatus, ClassNumber};
use crate::backend::domain::Result;
use shared::{AttendanceMark, AttendanceRecord, AttendanceStatus as SharedStatus, MarkAttendanceRequest};

pub struct AttendanceMapper;

impl AttendanceMapper {
    pub fn status_to_dto(status: DomainStatus) -> SharedStatus {
        match status {
            DomainStatus::Present => SharedStatus::Present,
            DomainStatus::Absent => SharedStatus::Absent,
        }
    }

    pub fn status_to_domain(status: SharedStatus) -> DomainStatus {
        match status {
            SharedStatus::Present => DomainStatus::Present,
            SharedStatus::Absent => DomainStatus::Absent,
        }
    }

    pub fn to_record_dto(event: AttendanceEvent) -> AttendanceRecord {
        AttendanceRecord {
            date: format_date(event.date),
            class_num: event.class_num.get(),
            student_id: event.student_id,
            status: Self::status_to_dto(event.status),
            reason: event.reason,
        }
    }

    pub fn to_mark_dto(event: AttendanceEvent) -> AttendanceMark {
        AttendanceMark {
            student_id: event.student_id,
            status: Self::status_to_dto(event.status),
            reason: event.reason,
        }
    }

    pub fn to_mark_command(request: MarkAttendanceRequest) -> Result<MarkAttendanceCommand> {
        Ok(MarkAttendanceCommand {
            class_num: ClassNumber::new(request.class_num)?,
            date: request.date,
            marks: request
                .marks
                .into_iter()
                .map(|mark| MarkEntry {
                    student_id: mark.student_id,
                    status: Self::status_to_domain(mark.status),
                    reason: mark.reason,
                })
                .collect(),
        })
    }
}
