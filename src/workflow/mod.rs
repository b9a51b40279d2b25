//! Document lifecycle rules.
//!
//! Everything here is pure: which actions each document kind accepts in each
//! status, where those actions lead, and when a quote needs approval. The
//! services consult these tables inside their transactions.

pub mod approval;
pub mod rules;
pub mod status;

pub use approval::ApprovalPolicy;
pub use rules::{allowed_actions, is_allowed, plan, PlanContext, Transition, WorkflowError};
pub use status::{DocumentKind, DocumentStatus, WorkflowAction};

pub fn is_editable(status: DocumentStatus) -> bool {
    status.is_editable()
}

pub fn is_terminal(status: DocumentStatus) -> bool {
    status.is_terminal()
}
