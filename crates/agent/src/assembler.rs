use marquee_core::domain::{Decision, DraftAnswer, GuardrailKind, Outcome, RequestId, Response};
use marquee_core::errors::PipelineError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("decision accepts although the {0} check failed")]
    AcceptedWithFailure(GuardrailKind),
    #[error("decision rejects without a failing verdict")]
    RejectedWithoutFailure,
    #[error("decision rejects with an empty reason")]
    EmptyRejectionReason,
    #[error("failed checks {reported:?} do not match failing verdicts {actual:?}")]
    FailedChecksMismatch { reported: Vec<GuardrailKind>, actual: Vec<GuardrailKind> },
}

impl From<AssemblyError> for PipelineError {
    fn from(error: AssemblyError) -> Self {
        PipelineError::InternalConsistency(error.to_string())
    }
}

/// Turns a reviewed draft into the terminal response. Pure; never consults the
/// reasoning capability.
pub fn assemble(
    request_id: RequestId,
    draft: DraftAnswer,
    decision: Decision,
) -> Result<Response, AssemblyError> {
    let failing: Vec<GuardrailKind> =
        decision.verdicts.iter().filter(|verdict| !verdict.passed).map(|verdict| verdict.kind).collect();

    match decision.outcome {
        Outcome::Accept => {
            if let Some(kind) = failing.first() {
                return Err(AssemblyError::AcceptedWithFailure(*kind));
            }
            Ok(Response::success(request_id, draft, decision.verdicts))
        }
        Outcome::Reject { reason, failed_checks } => {
            if failing.is_empty() {
                return Err(AssemblyError::RejectedWithoutFailure);
            }
            if reason.trim().is_empty() {
                return Err(AssemblyError::EmptyRejectionReason);
            }
            if failed_checks != failing {
                return Err(AssemblyError::FailedChecksMismatch {
                    reported: failed_checks,
                    actual: failing,
                });
            }
            Ok(Response::Rejected {
                request_id,
                category: draft.category,
                reason,
                failed_checks,
                verdicts: decision.verdicts,
                notes: draft.notes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::{
        Category, Decision, DraftAnswer, Evidence, EvidenceValue, GuardrailKind, GuardrailVerdict,
        Outcome, RequestId, Response,
    };

    use super::{assemble, AssemblyError};

    fn draft() -> DraftAnswer {
        DraftAnswer::new(
            Category::Analytics,
            "20% of the catalog is Korean content (200 of 1000 titles).",
            Evidence::new().with("percentage", EvidenceValue::Percentage(20.0)),
        )
    }

    fn verdicts(failing: Option<GuardrailKind>) -> Vec<GuardrailVerdict> {
        GuardrailKind::ORDER
            .iter()
            .map(|kind| {
                let score = if Some(*kind) == failing { 0.1 } else { 0.95 };
                GuardrailVerdict::new(*kind, score, 0.8, "checked")
            })
            .collect()
    }

    fn request_id() -> RequestId {
        RequestId("req-1".to_owned())
    }

    #[test]
    fn accepting_decision_yields_success_with_draft_text() {
        let response =
            assemble(request_id(), draft(), Decision::from_verdicts(verdicts(None))).expect("consistent");

        match response {
            Response::Success { answer, verdicts, .. } => {
                assert_eq!(answer, draft().text);
                assert_eq!(verdicts.len(), 4);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn rejecting_decision_yields_rejection_with_reason() {
        let decision = Decision::from_verdicts(verdicts(Some(GuardrailKind::Bias)));
        let response = assemble(request_id(), draft(), decision).expect("consistent");

        assert_eq!(response.status(), "rejected");
        assert!(response.reason().is_some_and(|reason| reason.starts_with("bias check failed")));
    }

    #[test]
    fn unchecked_decision_is_a_success_without_verdicts() {
        let response = assemble(request_id(), draft(), Decision::unchecked()).expect("consistent");
        assert!(response.is_success());
        assert!(response.verdicts().is_empty());
    }

    #[test]
    fn inconsistent_decisions_are_errors() {
        let accept_with_failure =
            Decision::new(verdicts(Some(GuardrailKind::Quality)), Outcome::Accept);
        assert_eq!(
            assemble(request_id(), draft(), accept_with_failure),
            Err(AssemblyError::AcceptedWithFailure(GuardrailKind::Quality))
        );

        let reject_without_failure = Decision::new(
            verdicts(None),
            Outcome::Reject { reason: "nope".to_owned(), failed_checks: vec![] },
        );
        assert_eq!(
            assemble(request_id(), draft(), reject_without_failure),
            Err(AssemblyError::RejectedWithoutFailure)
        );

        let empty_reason = Decision::new(
            verdicts(Some(GuardrailKind::Bias)),
            Outcome::Reject { reason: "  ".to_owned(), failed_checks: vec![GuardrailKind::Bias] },
        );
        assert_eq!(
            assemble(request_id(), draft(), empty_reason),
            Err(AssemblyError::EmptyRejectionReason)
        );
    }
}
