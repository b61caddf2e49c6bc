use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::checklist::RequirementChecklist;
use super::compliance::{
    ComplianceAssessment, ComplianceGuard, CompliancePolicy, ComplianceViolation,
};
use super::domain::{FileUpload, RequirementKind, SellerId, SellerRecord, SellerStatus};
use super::receipt::SellerReceipt;
use super::store::{SellerStore, StoreError};
use crate::session::{SessionContext, SessionError};

/// Service composing the compliance guard and a seller store.
pub struct SellerApprovalService<S> {
    guard: ComplianceGuard,
    store: Arc<S>,
}

/// A record paired with its derivation at read time.
#[derive(Debug, Clone, Serialize)]
pub struct SellerSnapshot {
    pub record: SellerRecord,
    pub assessment: ComplianceAssessment,
}

/// Detail view returned when an admin opens a seller.
#[derive(Debug, Clone, Serialize)]
pub struct SellerDetail {
    pub record: SellerRecord,
    pub assessment: ComplianceAssessment,
    pub auto_rejected: bool,
}

/// Client-side table filter.
#[derive(Debug, Clone, Default)]
pub struct SellerQuery {
    pub display_status: Option<SellerStatus>,
    pub search: Option<String>,
}

impl SellerQuery {
    fn matches(&self, snapshot: &SellerSnapshot) -> bool {
        if let Some(status) = self.display_status {
            if snapshot.assessment.display_status != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                let record = &snapshot.record;
                [&record.unique_id, &record.name, &record.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

impl<S> SellerApprovalService<S>
where
    S: SellerStore + 'static,
{
    pub fn new(store: Arc<S>, policy: CompliancePolicy) -> Self {
        Self {
            guard: ComplianceGuard::with_policy(policy),
            store,
        }
    }

    pub fn policy(&self) -> &CompliancePolicy {
        self.guard.policy()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn load(&self, id: &SellerId) -> Result<SellerRecord, ApprovalError> {
        let record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Every seller with its display status derived at `now`.
    pub async fn list(
        &self,
        query: &SellerQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<SellerSnapshot>, ApprovalError> {
        let records = self.store.list().await?;
        Ok(records
            .into_iter()
            .map(|record| {
                let assessment = self.policy().assess(&record, now);
                SellerSnapshot { record, assessment }
            })
            .filter(|snapshot| query.matches(snapshot))
            .collect())
    }

    /// Open a seller: ask the store to re-evaluate, then apply the derivation
    /// locally and persist an auto-rejection the store did not perform.
    pub async fn check_requirements(
        &self,
        session: &SessionContext,
        id: &SellerId,
        now: DateTime<Utc>,
    ) -> Result<SellerDetail, ApprovalError> {
        session.authorize(now)?;

        let before = self.load(id).await?;
        let mut record = self.store.check_requirements(id).await?;

        if self.policy().assess(&record, now).requires_auto_rejection() {
            record = self.store.update_status(id, SellerStatus::Rejected).await?;
        }

        let auto_rejected =
            before.status == SellerStatus::Pending && record.status == SellerStatus::Rejected;
        if auto_rejected {
            warn!(
                seller = %record.unique_id,
                admin = %session.admin_id,
                "seller rejected: requirements incomplete past the compliance deadline"
            );
        }

        let assessment = self.policy().assess(&record, now);
        Ok(SellerDetail {
            record,
            assessment,
            auto_rejected,
        })
    }

    /// Route a requested status to the matching operation.
    pub async fn transition(
        &self,
        session: &SessionContext,
        id: &SellerId,
        target: SellerStatus,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        match target {
            SellerStatus::Accepted => self.accept(session, id, now).await,
            SellerStatus::Rejected => self.reject(session, id, now).await,
            SellerStatus::Pending => Err(ApprovalError::Validation(
                ComplianceViolation::InvalidTransition { target },
            )),
        }
    }

    /// Accept a pending seller. Incomplete sellers are refused without a write;
    /// complete sellers past the deadline are rejected instead.
    pub async fn accept(
        &self,
        session: &SessionContext,
        id: &SellerId,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        session.authorize(now)?;
        let record = self.load(id).await?;

        match self.guard.check_acceptance(&record, now) {
            Ok(_) => {
                let accepted = self.store.update_status(id, SellerStatus::Accepted).await?;
                info!(seller = %accepted.unique_id, admin = %session.admin_id, "seller accepted");
                Ok(accepted)
            }
            Err(ComplianceViolation::DeadlineExceeded { days, deadline }) => {
                let rejected = self.store.update_status(id, SellerStatus::Rejected).await?;
                warn!(
                    seller = %rejected.unique_id,
                    admin = %session.admin_id,
                    days,
                    "acceptance refused past the compliance deadline; seller rejected"
                );
                Err(ApprovalError::DeadlineExceeded { days, deadline })
            }
            Err(violation) => Err(ApprovalError::Validation(violation)),
        }
    }

    /// Explicit admin rejection of a pending seller.
    pub async fn reject(
        &self,
        session: &SessionContext,
        id: &SellerId,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        session.authorize(now)?;
        let record = self.load(id).await?;
        self.guard
            .check_mutable(&record)
            .map_err(ApprovalError::Validation)?;

        let rejected = self.store.update_status(id, SellerStatus::Rejected).await?;
        info!(seller = %rejected.unique_id, admin = %session.admin_id, "seller rejected");
        Ok(rejected)
    }

    /// Persist the checklist's manual toggles in one write. An unchanged
    /// checklist performs no write and returns the current record.
    pub async fn save_requirements(
        &self,
        session: &SessionContext,
        checklist: &mut RequirementChecklist,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        session.authorize(now)?;
        let id = checklist.seller_id().clone();
        let record = self.load(&id).await?;
        self.guard
            .check_mutable(&record)
            .map_err(ApprovalError::Validation)?;

        let Some(requirements) = checklist.pending_update() else {
            return Ok(record);
        };

        let saved = self.store.save_requirements(&id, requirements).await?;
        checklist.mark_saved();
        info!(seller = %saved.unique_id, admin = %session.admin_id, "requirements saved");
        Ok(saved)
    }

    pub async fn upload_file(
        &self,
        session: &SessionContext,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        session.authorize(now)?;
        let content_type = self
            .guard
            .check_document(&upload.content_type)
            .map_err(ApprovalError::Validation)?;
        let record = self.load(id).await?;
        self.guard
            .check_mutable(&record)
            .map_err(ApprovalError::Validation)?;

        let upload = FileUpload {
            file_name: upload.file_name,
            content_type: content_type.essence_str().to_string(),
        };
        let updated = self.store.attach_file(id, requirement, upload).await?;
        info!(seller = %updated.unique_id, %requirement, "requirement file uploaded");
        Ok(updated)
    }

    pub async fn delete_file(
        &self,
        session: &SessionContext,
        id: &SellerId,
        requirement: RequirementKind,
        now: DateTime<Utc>,
    ) -> Result<SellerRecord, ApprovalError> {
        session.authorize(now)?;
        let record = self.load(id).await?;
        self.guard
            .check_mutable(&record)
            .map_err(ApprovalError::Validation)?;

        let updated = self.store.detach_file(id, requirement).await?;
        info!(seller = %updated.unique_id, %requirement, "requirement file deleted");
        Ok(updated)
    }

    pub async fn receipt(
        &self,
        id: &SellerId,
        now: DateTime<Utc>,
    ) -> Result<SellerReceipt, ApprovalError> {
        let record = self.load(id).await?;
        Ok(SellerReceipt::build(&record, now, self.policy()))
    }
}

/// Error raised by the approval service.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error(transparent)]
    Validation(ComplianceViolation),
    #[error("compliance deadline exceeded ({days} days since registration, limit {deadline}); seller has been rejected")]
    DeadlineExceeded { days: i64, deadline: i64 },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApprovalError {
    /// Stable category reported to the initiating action.
    pub fn kind(&self) -> &'static str {
        match self {
            ApprovalError::Validation(_) => "validation",
            ApprovalError::DeadlineExceeded { .. } => "deadline-exceeded",
            ApprovalError::Session(_) => "session",
            ApprovalError::Store(_) => "network/server",
        }
    }
}
