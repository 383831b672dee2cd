//! Exam-leave days and vacation intentions, validated against the blocking
//! windows configured in [`MetaConfig`](super::domain::MetaConfig).

pub mod exam_leave;
mod link;
pub mod vacation;

pub use exam_leave::{earliest_exam_leave, remove_exam_leave, request_exam_leave, ExamLeaveOutcome};
pub use link::sanitize_link;
pub use vacation::{
    delete_vacation, ensure_vacation_mutable, pauta_deadline, request_vacation, upsert_pauta,
    MAX_VACATION_DAYS, MIN_VACATION_DAYS,
};
