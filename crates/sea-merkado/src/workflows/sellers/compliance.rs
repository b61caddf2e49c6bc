use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{RequirementKind, SellerRecord, SellerStatus};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
pub const DEFAULT_DEADLINE_DAYS: i64 = 3;

/// Whole days between registration and `now`, rounded to the nearest day.
///
/// Halves round up, so a seller registered 36 hours ago reads as two days old.
pub fn elapsed_days(date_added: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = now
        .signed_duration_since(date_added)
        .num_milliseconds()
        .unsigned_abs();
    (millis as f64 / MILLIS_PER_DAY).round() as i64
}

/// Display status under the default three day deadline.
pub fn derive_status(record: &SellerRecord, now: DateTime<Utc>) -> SellerStatus {
    CompliancePolicy::default().derive_status(record, now)
}

/// Validation errors raised by the compliance guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComplianceViolation {
    #[error("incomplete requirements: missing {}", join_labels(.missing))]
    IncompleteRequirements { missing: Vec<RequirementKind> },
    #[error("compliance deadline exceeded ({days} days since registration, limit {deadline})")]
    DeadlineExceeded { days: i64, deadline: i64 },
    #[error("seller is already {status}")]
    AlreadyFinalized { status: SellerStatus },
    #[error("cannot move a seller to {target}")]
    InvalidTransition { target: SellerStatus },
    #[error("unsupported document type '{content_type}' (expected PDF or image)")]
    UnsupportedDocument { content_type: String },
}

fn join_labels(kinds: &[RequirementKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deadline dial shared by every consumer of the derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompliancePolicy {
    deadline_days: i64,
}

impl CompliancePolicy {
    pub fn new(deadline_days: i64) -> Self {
        let sanitized = if deadline_days > 0 {
            deadline_days
        } else {
            DEFAULT_DEADLINE_DAYS
        };

        Self {
            deadline_days: sanitized,
        }
    }

    pub fn deadline_days(&self) -> i64 {
        self.deadline_days
    }

    pub fn is_past_deadline(&self, days: i64) -> bool {
        days >= self.deadline_days
    }

    pub fn derive_status(&self, record: &SellerRecord, now: DateTime<Utc>) -> SellerStatus {
        self.assess(record, now).display_status
    }

    /// Evaluate a record at `now`. Never cache the result across reads.
    pub fn assess(&self, record: &SellerRecord, now: DateTime<Utc>) -> ComplianceAssessment {
        let days = elapsed_days(record.date_added, now);
        let compliant = record.requirements.is_complete();

        let display_status = if record.status.is_terminal() {
            record.status
        } else if !compliant && self.is_past_deadline(days) {
            SellerStatus::Rejected
        } else {
            SellerStatus::Pending
        };

        ComplianceAssessment {
            persisted_status: record.status,
            display_status,
            days_since_registration: days,
            compliant,
            missing: record.requirements.missing(),
            deadline_days: self.deadline_days,
        }
    }
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE_DAYS)
    }
}

/// Result of running the derivation against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceAssessment {
    pub persisted_status: SellerStatus,
    pub display_status: SellerStatus,
    pub days_since_registration: i64,
    pub compliant: bool,
    pub missing: Vec<RequirementKind>,
    pub deadline_days: i64,
}

impl ComplianceAssessment {
    /// The only case where the derived status may be written back.
    pub fn requires_auto_rejection(&self) -> bool {
        self.persisted_status == SellerStatus::Pending
            && self.display_status == SellerStatus::Rejected
    }

    /// Receipt warning; independent of the persisted status.
    pub fn deadline_warning(&self) -> bool {
        !self.compliant && self.days_since_registration >= self.deadline_days
    }
}

/// Guard holding the acceptance precondition chain.
#[derive(Debug, Clone, Default)]
pub struct ComplianceGuard {
    policy: CompliancePolicy,
}

impl ComplianceGuard {
    pub fn with_policy(policy: CompliancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CompliancePolicy {
        &self.policy
    }

    /// Preconditions for accepting a seller, checked in order: terminal status,
    /// completeness, then the deadline.
    pub fn check_acceptance(
        &self,
        record: &SellerRecord,
        now: DateTime<Utc>,
    ) -> Result<ComplianceAssessment, ComplianceViolation> {
        if record.status.is_terminal() {
            return Err(ComplianceViolation::AlreadyFinalized {
                status: record.status,
            });
        }

        let assessment = self.policy.assess(record, now);
        if !assessment.compliant {
            return Err(ComplianceViolation::IncompleteRequirements {
                missing: assessment.missing,
            });
        }

        if self
            .policy
            .is_past_deadline(assessment.days_since_registration)
        {
            return Err(ComplianceViolation::DeadlineExceeded {
                days: assessment.days_since_registration,
                deadline: self.policy.deadline_days(),
            });
        }

        Ok(assessment)
    }

    pub fn check_mutable(&self, record: &SellerRecord) -> Result<(), ComplianceViolation> {
        if record.status.is_terminal() {
            return Err(ComplianceViolation::AlreadyFinalized {
                status: record.status,
            });
        }
        Ok(())
    }

    pub fn check_document(&self, content_type: &str) -> Result<mime::Mime, ComplianceViolation> {
        let unsupported = || ComplianceViolation::UnsupportedDocument {
            content_type: content_type.to_string(),
        };
        let parsed: mime::Mime = content_type.trim().parse().map_err(|_| unsupported())?;

        let is_pdf = parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::PDF;
        if parsed.type_() == mime::IMAGE || is_pdf {
            Ok(parsed)
        } else {
            Err(unsupported())
        }
    }
}
