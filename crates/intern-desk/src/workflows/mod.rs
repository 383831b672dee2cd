//! Rule engine for intern absences, hours ledgers, approvals and retention.
//!
//! Every operation takes the loaded [`State`] by mutable reference plus an
//! [`ActionContext`] and either mutates the state completely or returns a
//! [`DeskError`] without touching it. Persistence is the caller's job; see
//! [`crate::service::DeskService`].

pub mod absence;
pub mod access;
pub mod accounts;
pub mod approval;
pub mod audit;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod retention;
pub mod router;

#[cfg(test)]
mod tests;

pub use access::{has_power, ActionContext, Capability, Powers, Role};
pub use approval::{Acknowledgements, ApprovalProof};
pub use domain::{
    EntryType, ExamLeaveRecord, HoursEntry, Intern, MetaConfig, PautaRecord, PendingRegistration,
    State, TrashItem, TrashPayload, User, VacationRequest, VacationStatus,
};
pub use error::{AuthorizationError, DeskError, EntityKind, PolicyBlock, ValidationError};
pub use ledger::{EntryDraft, LedgerSummary};
pub use router::desk_router;
