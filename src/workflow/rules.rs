use serde::Serialize;
use utoipa::ToSchema;

use super::status::{DocumentKind, DocumentStatus, WorkflowAction};

use DocumentStatus::*;
use WorkflowAction::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("action '{action}' is not allowed for {kind} in status '{status}'")]
    NotAllowed {
        kind: DocumentKind,
        status: DocumentStatus,
        action: WorkflowAction,
    },
}

/// The outcome of planning an action: where the document goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Transition {
    pub from: DocumentStatus,
    pub to: DocumentStatus,
    pub action: WorkflowAction,
    pub bumps_version: bool,
}

/// Facts about the document that some transitions depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanContext {
    /// Set when the approval policy says the document needs a second pair of eyes.
    pub approval_required: bool,
}

impl PlanContext {
    pub fn requiring_approval(approval_required: bool) -> Self {
        Self { approval_required }
    }
}

/// Kinds whose flow runs past `shipped` may not be cancelled once goods left.
fn cancel_allowed(kind: DocumentKind, status: DocumentStatus) -> bool {
    if status.is_terminal() {
        return false;
    }
    !matches!(
        (kind, status),
        (DocumentKind::ExportOrder, Shipped)
            | (DocumentKind::PurchaseOrder, Confirmed)
            | (DocumentKind::ShippingBill, Shipped)
    )
}

/// Non-cancel moves per kind and status, in the order buttons are shown.
fn moves(kind: DocumentKind, status: DocumentStatus) -> &'static [(WorkflowAction, DocumentStatus)] {
    match kind {
        DocumentKind::Enquiry => match status {
            Draft => &[(Submit, Pending)],
            Pending => &[(Convert, Converted)],
            _ => &[],
        },
        DocumentKind::Quote => match status {
            // Submit lands on pending or approved depending on the approval policy.
            Draft | Revised => &[(Submit, Pending)],
            Pending => &[(Approve, Approved), (Reject, Rejected)],
            Approved => &[(Send, Sent), (Convert, Converted), (Revise, Revised)],
            Sent => &[(Convert, Converted), (Reject, Rejected), (Revise, Revised)],
            Rejected => &[(Revise, Revised)],
            _ => &[],
        },
        DocumentKind::ProformaInvoice => match status {
            Draft | Revised => &[(Submit, Pending)],
            Pending => &[(Approve, Approved), (Reject, Rejected)],
            Approved => &[
                (Send, Sent),
                (Confirm, Confirmed),
                (Convert, Converted),
                (Revise, Revised),
            ],
            Sent => &[
                (Confirm, Confirmed),
                (Convert, Converted),
                (Reject, Rejected),
                (Revise, Revised),
            ],
            Confirmed => &[(Convert, Converted)],
            Rejected => &[(Revise, Revised)],
            _ => &[],
        },
        DocumentKind::ExportOrder => match status {
            Draft => &[(Confirm, Confirmed)],
            Confirmed => &[(Ship, Shipped), (Convert, Converted)],
            Shipped => &[(Complete, Completed), (Convert, Converted)],
            _ => &[],
        },
        DocumentKind::PurchaseOrder => match status {
            Draft | Revised => &[(Submit, Pending)],
            Pending => &[(Approve, Approved), (Reject, Rejected)],
            Approved => &[(Send, Sent), (Revise, Revised)],
            Sent => &[(Confirm, Confirmed), (Revise, Revised)],
            Confirmed => &[(Complete, Completed)],
            Rejected => &[(Revise, Revised)],
            _ => &[],
        },
        DocumentKind::ShippingBill => match status {
            Draft | Revised => &[(Submit, Pending)],
            Pending => &[(Approve, Approved), (Reject, Rejected)],
            Approved => &[(Ship, Shipped)],
            Shipped => &[(Complete, Completed)],
            Rejected => &[(Revise, Revised)],
            _ => &[],
        },
    }
}

/// Actions a user may take on a document of `kind` currently in `status`.
pub fn allowed_actions(kind: DocumentKind, status: DocumentStatus) -> Vec<WorkflowAction> {
    let mut actions: Vec<WorkflowAction> = moves(kind, status).iter().map(|(a, _)| *a).collect();
    if cancel_allowed(kind, status) {
        actions.push(Cancel);
    }
    actions
}

pub fn is_allowed(kind: DocumentKind, status: DocumentStatus, action: WorkflowAction) -> bool {
    allowed_actions(kind, status).contains(&action)
}

/// Decides the target status for `action`, or refuses it.
pub fn plan(
    kind: DocumentKind,
    status: DocumentStatus,
    action: WorkflowAction,
    ctx: PlanContext,
) -> Result<Transition, WorkflowError> {
    let not_allowed = || WorkflowError::NotAllowed {
        kind,
        status,
        action,
    };

    let to = if action == Cancel {
        if !cancel_allowed(kind, status) {
            return Err(not_allowed());
        }
        Cancelled
    } else {
        let (_, target) = moves(kind, status)
            .iter()
            .find(|(a, _)| *a == action)
            .ok_or_else(not_allowed)?;
        match (kind, action) {
            (DocumentKind::Quote, Submit) if !ctx.approval_required => Approved,
            _ => *target,
        }
    };

    Ok(Transition {
        from: status,
        to,
        action,
        bumps_version: action == Revise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const NEEDS_APPROVAL: PlanContext = PlanContext {
        approval_required: true,
    };

    #[test_case(DocumentKind::Enquiry, Draft, &[Submit, Cancel] ; "enquiry draft")]
    #[test_case(DocumentKind::Enquiry, Pending, &[Convert, Cancel] ; "enquiry pending")]
    #[test_case(DocumentKind::Quote, Draft, &[Submit, Cancel] ; "quote draft")]
    #[test_case(DocumentKind::Quote, Sent, &[Convert, Reject, Revise, Cancel] ; "quote sent")]
    #[test_case(DocumentKind::Quote, Rejected, &[Revise, Cancel] ; "quote rejected")]
    #[test_case(DocumentKind::ProformaInvoice, Confirmed, &[Convert, Cancel] ; "pi confirmed")]
    #[test_case(DocumentKind::ExportOrder, Draft, &[Confirm, Cancel] ; "order draft")]
    #[test_case(DocumentKind::ExportOrder, Shipped, &[Complete, Convert] ; "order shipped cannot cancel")]
    #[test_case(DocumentKind::PurchaseOrder, Confirmed, &[Complete] ; "po confirmed cannot cancel")]
    #[test_case(DocumentKind::ShippingBill, Approved, &[Ship, Cancel] ; "sb approved")]
    #[test_case(DocumentKind::ShippingBill, Shipped, &[Complete] ; "sb shipped")]
    fn allow_lists(kind: DocumentKind, status: DocumentStatus, expected: &[WorkflowAction]) {
        assert_eq!(allowed_actions(kind, status), expected.to_vec());
    }

    #[test_case(Converted ; "converted")]
    #[test_case(Completed ; "completed")]
    #[test_case(Cancelled ; "cancelled")]
    fn terminal_statuses_accept_nothing(status: DocumentStatus) {
        use strum::IntoEnumIterator;
        for kind in [
            DocumentKind::Enquiry,
            DocumentKind::Quote,
            DocumentKind::ProformaInvoice,
            DocumentKind::ExportOrder,
            DocumentKind::PurchaseOrder,
            DocumentKind::ShippingBill,
        ] {
            assert!(allowed_actions(kind, status).is_empty());
            for action in WorkflowAction::iter() {
                assert!(plan(kind, status, action, NEEDS_APPROVAL).is_err());
            }
        }
    }

    #[test]
    fn quote_submit_depends_on_approval_policy() {
        let pending = plan(DocumentKind::Quote, Draft, Submit, NEEDS_APPROVAL).unwrap();
        assert_eq!(pending.to, Pending);

        let auto = plan(DocumentKind::Quote, Revised, Submit, PlanContext::default()).unwrap();
        assert_eq!(auto.to, Approved);
    }

    #[test]
    fn other_kinds_always_go_through_pending() {
        let t = plan(
            DocumentKind::PurchaseOrder,
            Draft,
            Submit,
            PlanContext::default(),
        )
        .unwrap();
        assert_eq!(t.to, Pending);
    }

    #[test]
    fn only_revise_bumps_version() {
        let revise = plan(DocumentKind::Quote, Rejected, Revise, NEEDS_APPROVAL).unwrap();
        assert!(revise.bumps_version);
        assert_eq!(revise.to, Revised);

        let send = plan(DocumentKind::Quote, Approved, Send, NEEDS_APPROVAL).unwrap();
        assert!(!send.bumps_version);
    }

    #[test]
    fn disallowed_action_reports_context() {
        let err = plan(DocumentKind::Quote, Draft, Approve, NEEDS_APPROVAL).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotAllowed {
                kind: DocumentKind::Quote,
                status: Draft,
                action: Approve,
            }
        );
        assert_eq!(
            err.to_string(),
            "action 'approve' is not allowed for quote in status 'draft'"
        );
    }

    #[test]
    fn enquiry_cannot_convert_before_submission() {
        assert!(!is_allowed(DocumentKind::Enquiry, Draft, Convert));
        assert!(is_allowed(DocumentKind::Enquiry, Pending, Convert));
    }
}
