use crate::backend::domain::commands::report::ReportQuery;
use crate::backend::domain::models::attendance::format_date;
use crate::backend::domain::models::{ClassNumber, ReportOutcome, ReportStats};
use crate::backend::domain::Result;
use shared::{ReportRequest, ReportResponse, ReportState, ReportSummary, StudentReportRow};

pub struct ReportMapper;

/// Percentages are kept exact in the domain and rounded for display here
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ReportMapper {
    pub fn to_query(request: ReportRequest) -> Result<ReportQuery> {
        Ok(ReportQuery {
            class_num: ClassNumber::new(request.class_num)?,
            start_date: request.start_date,
            end_date: request.end_date,
        })
    }

    pub fn to_dto(stats: ReportStats) -> ReportResponse {
        let start_date = format_date(stats.start_date);
        let end_date = format_date(stats.end_date);

        let (state, summary, students, message) = match stats.outcome {
            ReportOutcome::NoLogFile => (
                ReportState::NoLogFile,
                None,
                Vec::new(),
                "No attendance has been recorded yet".to_string(),
            ),
            ReportOutcome::NoRecordsInRange => (
                ReportState::NoRecordsInRange,
                None,
                Vec::new(),
                format!(
                    "No records found for class {} between {} and {}",
                    stats.class_num, start_date, end_date
                ),
            ),
            ReportOutcome::Records { counts, students } => {
                let summary = ReportSummary {
                    total_records: counts.total_records,
                    present_count: counts.present_count,
                    absent_count: counts.absent_count,
                    present_percent: round2(counts.present_percent()),
                    absent_percent: round2(counts.absent_percent()),
                };
                let rows = students
                    .into_iter()
                    .map(|s| StudentReportRow {
                        present_percent: round2(s.present_percent()),
                        student_id: s.student_id,
                        name: s.name,
                        present_count: s.present_count,
                        absent_count: s.absent_count,
                    })
                    .collect();
                let message = format!(
                    "{} records: {:.2}% present, {:.2}% absent",
                    summary.total_records, summary.present_percent, summary.absent_percent
                );
                (ReportState::RecordsFound, Some(summary), rows, message)
            }
        };

        ReportResponse {
            class_num: stats.class_num.get(),
            start_date,
            end_date,
            state,
            summary,
            students,
            message,
        }
    }
}
