use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::compliance::CompliancePolicy;
use super::domain::{
    unique_id_for, FileUpload, NewSeller, RequirementFile, RequirementKind, Requirements,
    SellerId, SellerRecord, SellerStatus,
};
use crate::workflows::notifications::{Notification, NotificationFeed, NotificationSource};

/// Seller store endpoints, abstracted so the approval service can run against
/// the REST API or an in-process store.
#[async_trait]
pub trait SellerStore: Send + Sync {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError>;
    async fn fetch(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError>;
    async fn register(&self, seller: NewSeller) -> Result<SellerRecord, StoreError>;
    async fn update_status(
        &self,
        id: &SellerId,
        status: SellerStatus,
    ) -> Result<SellerRecord, StoreError>;
    async fn check_requirements(&self, id: &SellerId) -> Result<SellerRecord, StoreError>;
    async fn save_requirements(
        &self,
        id: &SellerId,
        requirements: Requirements,
    ) -> Result<SellerRecord, StoreError>;
    async fn attach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
    ) -> Result<SellerRecord, StoreError>;
    async fn detach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("seller not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("seller store unavailable: {0}")]
    Unavailable(String),
    #[error("seller store returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected seller store payload: {0}")]
    Decode(String),
}

/// Reference in-process store: holds records in memory and applies the
/// server-side rules (terminal statuses are sticky, file-backed flags follow
/// their files, check-requirements persists auto-rejections).
pub struct MemorySellerStore {
    records: Mutex<HashMap<SellerId, SellerRecord>>,
    notifications: Mutex<Vec<Notification>>,
    policy: CompliancePolicy,
    clock: fn() -> DateTime<Utc>,
    sequence: AtomicU64,
    notification_sequence: AtomicU64,
}

impl Default for MemorySellerStore {
    fn default() -> Self {
        Self::new(CompliancePolicy::default())
    }
}

impl MemorySellerStore {
    pub fn new(policy: CompliancePolicy) -> Self {
        Self::with_clock(policy, Utc::now)
    }

    pub fn with_clock(policy: CompliancePolicy, clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
            policy,
            clock,
            sequence: AtomicU64::new(1),
            notification_sequence: AtomicU64::new(1),
        }
    }

    pub fn shared(policy: CompliancePolicy) -> Arc<Self> {
        Arc::new(Self::new(policy))
    }

    pub fn policy(&self) -> &CompliancePolicy {
        &self.policy
    }

    /// Insert or replace a record as-is (fixtures, imports). Numeric ids move
    /// the registration sequence past them.
    pub fn seed(&self, record: SellerRecord) {
        if let Ok(numeric) = record.id.0.parse::<u64>() {
            self.sequence
                .fetch_max(numeric.saturating_add(1), Ordering::Relaxed);
        }
        self.records
            .lock()
            .expect("seller store mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub fn push_notification(&self, notification: Notification) {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
    }

    fn notify(&self, feed: NotificationFeed, message: String) {
        let sequence = self.notification_sequence.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.notifications.lock().expect("notification mutex poisoned");
        let id = format!("{}-{sequence}", feed.key());
        guard.push(Notification {
            id,
            feed,
            message,
            created_at: (self.clock)(),
        });
    }

    fn modify<F>(&self, id: &SellerId, apply: F) -> Result<SellerRecord, StoreError>
    where
        F: FnOnce(&mut SellerRecord) -> Result<(), StoreError>,
    {
        let mut guard = self.records.lock().expect("seller store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        apply(record)?;
        Ok(record.clone())
    }
}

fn ensure_pending(record: &SellerRecord) -> Result<(), StoreError> {
    if record.status.is_terminal() {
        return Err(StoreError::Conflict(format!(
            "seller {} is already {}",
            record.unique_id, record.status
        )));
    }
    Ok(())
}

#[async_trait]
impl SellerStore for MemorySellerStore {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError> {
        let guard = self.records.lock().expect("seller store mutex poisoned");
        let mut records: Vec<SellerRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.date_added
                .cmp(&a.date_added)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn fetch(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        let guard = self.records.lock().expect("seller store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn register(&self, seller: NewSeller) -> Result<SellerRecord, StoreError> {
        let name = seller.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Invalid("seller name is required".to_string()));
        }

        let now = (self.clock)();
        let record = {
            let mut guard = self.records.lock().expect("seller store mutex poisoned");

            let mut id = SellerId(self.sequence.fetch_add(1, Ordering::Relaxed).to_string());
            while guard.contains_key(&id) {
                id = SellerId(self.sequence.fetch_add(1, Ordering::Relaxed).to_string());
            }

            // Seller codes are millisecond based; same-millisecond registrations
            // take the next free millisecond.
            let mut created_at = now;
            let mut unique_id = unique_id_for(created_at);
            while guard.values().any(|existing| existing.unique_id == unique_id) {
                created_at += chrono::Duration::milliseconds(1);
                unique_id = unique_id_for(created_at);
            }

            let record = SellerRecord {
                id,
                unique_id,
                name,
                email: seller.email.trim().to_string(),
                status: SellerStatus::Pending,
                requirements: Requirements::default(),
                files: Vec::new(),
                date_added: now,
            };
            guard.insert(record.id.clone(), record.clone());
            record
        };

        info!(seller = %record.unique_id, "seller registered");
        self.notify(
            NotificationFeed::Sellers,
            format!("New seller registration: {}", record.name),
        );
        Ok(record)
    }

    async fn update_status(
        &self,
        id: &SellerId,
        status: SellerStatus,
    ) -> Result<SellerRecord, StoreError> {
        if status == SellerStatus::Pending {
            return Err(StoreError::Invalid(
                "status can only be set to accepted or rejected".to_string(),
            ));
        }

        let record = self.modify(id, |record| {
            ensure_pending(record)?;
            record.status = status;
            Ok(())
        })?;

        info!(seller = %record.unique_id, status = %status, "seller status persisted");
        self.notify(
            NotificationFeed::Sellers,
            format!("Seller {} was {}", record.name, status),
        );
        Ok(record)
    }

    async fn check_requirements(&self, id: &SellerId) -> Result<SellerRecord, StoreError> {
        let now = (self.clock)();
        let policy = self.policy;
        let mut auto_rejected = false;

        let record = self.modify(id, |record| {
            if policy.assess(record, now).requires_auto_rejection() {
                record.status = SellerStatus::Rejected;
                auto_rejected = true;
            }
            Ok(())
        })?;

        if auto_rejected {
            info!(seller = %record.unique_id, "seller auto-rejected after compliance deadline");
            self.notify(
                NotificationFeed::Sellers,
                format!(
                    "Seller {} was rejected for incomplete requirements",
                    record.name
                ),
            );
        }
        Ok(record)
    }

    async fn save_requirements(
        &self,
        id: &SellerId,
        requirements: Requirements,
    ) -> Result<SellerRecord, StoreError> {
        self.modify(id, |record| {
            ensure_pending(record)?;
            let mut next = requirements;
            for kind in RequirementKind::ALL {
                if record.has_file(kind) {
                    next.set(kind, true);
                }
            }
            debug!(seller = %record.unique_id, ?next, "requirements saved");
            record.requirements = next;
            Ok(())
        })
    }

    async fn attach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
    ) -> Result<SellerRecord, StoreError> {
        if upload.file_name.trim().is_empty() {
            return Err(StoreError::Invalid("file name is required".to_string()));
        }

        let uploaded_at = (self.clock)();
        self.modify(id, |record| {
            ensure_pending(record)?;
            record.files.retain(|file| file.requirement != requirement);
            record.files.push(RequirementFile {
                requirement,
                file_name: upload.file_name,
                content_type: upload.content_type,
                uploaded_at,
            });
            record.requirements.set(requirement, true);
            Ok(())
        })
    }

    async fn detach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError> {
        self.modify(id, |record| {
            ensure_pending(record)?;
            let before = record.files.len();
            record.files.retain(|file| file.requirement != requirement);
            if record.files.len() == before {
                return Err(StoreError::NotFound);
            }
            record.requirements.set(requirement, false);
            Ok(())
        })
    }
}

#[async_trait]
impl NotificationSource for MemorySellerStore {
    async fn notifications(&self, feed: NotificationFeed) -> Result<Vec<Notification>, StoreError> {
        let guard = self.notifications.lock().expect("notification mutex poisoned");
        Ok(guard
            .iter()
            .filter(|notification| notification.feed == feed)
            .cloned()
            .collect())
    }
}
