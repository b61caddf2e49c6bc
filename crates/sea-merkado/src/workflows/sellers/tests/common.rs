use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::session::SessionContext;
use crate::workflows::sellers::compliance::CompliancePolicy;
use crate::workflows::sellers::domain::{
    FileUpload, NewSeller, RequirementFile, RequirementKind, Requirements, SellerId,
    SellerRecord, SellerStatus,
};
use crate::workflows::sellers::service::SellerApprovalService;
use crate::workflows::sellers::store::{MemorySellerStore, SellerStore, StoreError};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn seller(
    id: &str,
    status: SellerStatus,
    requirements: Requirements,
    age: Duration,
) -> SellerRecord {
    let date_added = now() - age;
    SellerRecord {
        id: SellerId(id.to_string()),
        unique_id: format!("SELLER-{}", date_added.timestamp_millis()),
        name: format!("Pantalan {id} Seafood Trading"),
        email: format!("seller{id}@merkado.test"),
        status,
        requirements,
        files: Vec::new(),
        date_added,
    }
}

pub(super) fn pending(id: &str, requirements: Requirements, age: Duration) -> SellerRecord {
    seller(id, SellerStatus::Pending, requirements, age)
}

pub(super) fn only(kinds: &[RequirementKind]) -> Requirements {
    let mut requirements = Requirements::default();
    for kind in kinds {
        requirements.set(*kind, true);
    }
    requirements
}

pub(super) fn file(requirement: RequirementKind, name: &str) -> RequirementFile {
    RequirementFile {
        requirement,
        file_name: name.to_string(),
        content_type: "application/pdf".to_string(),
        uploaded_at: now() - Duration::hours(1),
    }
}

pub(super) fn pdf(name: &str) -> FileUpload {
    FileUpload {
        file_name: name.to_string(),
        content_type: "application/pdf".to_string(),
    }
}

pub(super) fn session() -> SessionContext {
    SessionContext::issue(
        "admin-01",
        "Market Operations",
        now() - Duration::minutes(5),
        Duration::minutes(60),
    )
}

pub(super) fn expired_session() -> SessionContext {
    SessionContext::issue(
        "admin-01",
        "Market Operations",
        now() - Duration::hours(3),
        Duration::minutes(60),
    )
}

/// Wraps the memory store and records every write that reaches it.
pub(super) struct RecordingStore {
    pub(super) inner: MemorySellerStore,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub(super) fn with_records(records: Vec<SellerRecord>) -> Self {
        let inner = MemorySellerStore::with_clock(CompliancePolicy::default(), now);
        for record in records {
            inner.seed(record);
        }
        Self {
            inner,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("writes mutex poisoned").clone()
    }

    fn record_write(&self, entry: String) {
        self.writes.lock().expect("writes mutex poisoned").push(entry);
    }

    pub(super) async fn stored(&self, id: &str) -> SellerRecord {
        self.inner
            .fetch(&SellerId(id.to_string()))
            .await
            .expect("fetch succeeds")
            .expect("record present")
    }
}

#[async_trait]
impl SellerStore for RecordingStore {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError> {
        self.inner.list().await
    }

    async fn fetch(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        self.inner.fetch(id).await
    }

    async fn register(&self, seller: NewSeller) -> Result<SellerRecord, StoreError> {
        self.record_write(format!("register:{}", seller.name));
        self.inner.register(seller).await
    }

    async fn update_status(
        &self,
        id: &SellerId,
        status: SellerStatus,
    ) -> Result<SellerRecord, StoreError> {
        self.record_write(format!("status:{id}:{status}"));
        self.inner.update_status(id, status).await
    }

    async fn check_requirements(&self, id: &SellerId) -> Result<SellerRecord, StoreError> {
        self.inner.check_requirements(id).await
    }

    async fn save_requirements(
        &self,
        id: &SellerId,
        requirements: Requirements,
    ) -> Result<SellerRecord, StoreError> {
        self.record_write(format!("requirements:{id}"));
        self.inner.save_requirements(id, requirements).await
    }

    async fn attach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
    ) -> Result<SellerRecord, StoreError> {
        self.record_write(format!("attach:{id}:{requirement}"));
        self.inner.attach_file(id, requirement, upload).await
    }

    async fn detach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError> {
        self.record_write(format!("detach:{id}:{requirement}"));
        self.inner.detach_file(id, requirement).await
    }
}

/// Store whose check-requirements endpoint never auto-rejects, like an
/// external API that leaves the rule to the client.
pub(super) struct PassiveCheckStore(pub(super) RecordingStore);

#[async_trait]
impl SellerStore for PassiveCheckStore {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError> {
        self.0.list().await
    }

    async fn fetch(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        self.0.fetch(id).await
    }

    async fn register(&self, seller: NewSeller) -> Result<SellerRecord, StoreError> {
        self.0.register(seller).await
    }

    async fn update_status(
        &self,
        id: &SellerId,
        status: SellerStatus,
    ) -> Result<SellerRecord, StoreError> {
        self.0.update_status(id, status).await
    }

    async fn check_requirements(&self, id: &SellerId) -> Result<SellerRecord, StoreError> {
        self.0.fetch(id).await?.ok_or(StoreError::NotFound)
    }

    async fn save_requirements(
        &self,
        id: &SellerId,
        requirements: Requirements,
    ) -> Result<SellerRecord, StoreError> {
        self.0.save_requirements(id, requirements).await
    }

    async fn attach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
    ) -> Result<SellerRecord, StoreError> {
        self.0.attach_file(id, requirement, upload).await
    }

    async fn detach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError> {
        self.0.detach_file(id, requirement).await
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl SellerStore for UnavailableStore {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn fetch(&self, _id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn register(&self, _seller: NewSeller) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update_status(
        &self,
        _id: &SellerId,
        _status: SellerStatus,
    ) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn check_requirements(&self, _id: &SellerId) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn save_requirements(
        &self,
        _id: &SellerId,
        _requirements: Requirements,
    ) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn attach_file(
        &self,
        _id: &SellerId,
        _requirement: RequirementKind,
        _upload: FileUpload,
    ) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn detach_file(
        &self,
        _id: &SellerId,
        _requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub(super) fn build_service(
    records: Vec<SellerRecord>,
) -> (SellerApprovalService<RecordingStore>, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::with_records(records));
    let service = SellerApprovalService::new(store.clone(), CompliancePolicy::default());
    (service, store)
}

pub(super) fn memory_store(records: Vec<SellerRecord>) -> Arc<MemorySellerStore> {
    let store = MemorySellerStore::with_clock(CompliancePolicy::default(), now);
    for record in records {
        store.seed(record);
    }
    Arc::new(store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
