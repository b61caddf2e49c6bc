//! End-to-end scenarios for seller approval: the HTTP router is served on a local socket and
//! driven through the REST client and the approval service, the same way the admin CLI runs.

mod common {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::{DateTime, Duration, Utc};

    use sea_merkado::config::ApiConfig;
    use sea_merkado::session::SessionContext;
    use sea_merkado::workflows::sellers::{
        seller_router, ApiClient, CompliancePolicy, MemorySellerStore, RequirementKind,
        Requirements, SellerId, SellerRecord, SellerStatus,
    };

    pub(super) fn seller(id: &str, requirements: Requirements, age: Duration) -> SellerRecord {
        let date_added = Utc::now() - age;
        SellerRecord {
            id: SellerId(id.to_string()),
            unique_id: format!("SELLER-{}", date_added.timestamp_millis()),
            name: format!("Daungan {id} Fish Traders"),
            email: format!("daungan{id}@merkado.test"),
            status: SellerStatus::Pending,
            requirements,
            files: Vec::new(),
            date_added,
        }
    }

    pub(super) fn only(kinds: &[RequirementKind]) -> Requirements {
        let mut requirements = Requirements::default();
        for kind in kinds {
            requirements.set(*kind, true);
        }
        requirements
    }

    pub(super) fn session(now: DateTime<Utc>) -> SessionContext {
        SessionContext::issue("admin-02", "Seller Desk", now, Duration::minutes(30))
    }

    /// Serve the seller router on an ephemeral port and return a client bound to it.
    pub(super) async fn spawn_store(
        records: Vec<SellerRecord>,
    ) -> (ApiClient, Arc<MemorySellerStore>) {
        let store = MemorySellerStore::shared(CompliancePolicy::default());
        for record in records {
            store.seed(record);
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let router = seller_router(store.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve seller api");
        });

        let client = ApiClient::new(&ApiConfig {
            base_url: format!("http://{addr}"),
            timeout: StdDuration::from_secs(5),
        })
        .expect("client builds");
        (client, store)
    }
}

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::*;
use sea_merkado::workflows::notifications::collect_notifications;
use sea_merkado::workflows::sellers::{
    ApprovalError, CompliancePolicy, FileUpload, RequirementChecklist, RequirementKind,
    Requirements, SellerApprovalService, SellerId, SellerQuery, SellerStatus, SellerStore,
    StoreError, ToggleOutcome,
};

#[tokio::test]
async fn admin_completes_requirements_and_accepts_over_http() {
    let (client, store) = spawn_store(vec![seller(
        "7",
        only(&[RequirementKind::BarangayClearance]),
        Duration::days(1),
    )])
    .await;
    let service = SellerApprovalService::new(Arc::new(client), CompliancePolicy::default());
    let now = Utc::now();
    let session = session(now);
    let id = SellerId("7".to_string());

    let detail = service
        .check_requirements(&session, &id, now)
        .await
        .expect("open seller");
    assert!(!detail.auto_rejected);
    assert_eq!(detail.assessment.missing.len(), 2);

    let uploaded = service
        .upload_file(
            &session,
            &id,
            RequirementKind::IdProof,
            FileUpload {
                file_name: "national-id.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            },
            now,
        )
        .await
        .expect("upload over http");
    assert!(uploaded.requirements.id_proof);

    let mut checklist = RequirementChecklist::from_record(&uploaded);
    assert_eq!(
        checklist.toggle(RequirementKind::IdProof),
        ToggleOutcome::FileBacked
    );
    checklist.toggle(RequirementKind::BusinessPermit);
    let saved = service
        .save_requirements(&session, &mut checklist, now)
        .await
        .expect("save over http");
    assert!(saved.requirements.is_complete());

    let accepted = service
        .accept(&session, &id, now)
        .await
        .expect("accept over http");
    assert_eq!(accepted.status, SellerStatus::Accepted);

    let stored = store.fetch(&id).await.unwrap().expect("record present");
    assert_eq!(stored.status, SellerStatus::Accepted);
    assert_eq!(stored.files.len(), 1);
}

#[tokio::test]
async fn late_incomplete_seller_is_rejected_when_opened() {
    let (client, store) = spawn_store(vec![
        seller("1", Requirements::default(), Duration::days(4)),
        seller("2", Requirements::all_submitted(), Duration::days(4)),
    ])
    .await;
    let service = SellerApprovalService::new(Arc::new(client), CompliancePolicy::default());
    let now = Utc::now();

    let rejected_view = service
        .list(
            &SellerQuery {
                display_status: Some(SellerStatus::Rejected),
                search: None,
            },
            now,
        )
        .await
        .expect("list over http");
    assert_eq!(rejected_view.len(), 1);
    assert_eq!(rejected_view[0].record.status, SellerStatus::Pending);

    let detail = service
        .check_requirements(&session(now), &SellerId("1".to_string()), now)
        .await
        .expect("open seller");
    assert!(detail.auto_rejected);

    let stored = store
        .fetch(&SellerId("1".to_string()))
        .await
        .unwrap()
        .expect("record present");
    assert_eq!(stored.status, SellerStatus::Rejected);

    match service
        .accept(&session(now), &SellerId("2".to_string()), now)
        .await
    {
        Err(ApprovalError::DeadlineExceeded { days: 4, deadline: 3 }) => {}
        other => panic!("expected deadline exceeded, got {other:?}"),
    }

    let notifications = collect_notifications(service.store().as_ref(), Some(10)).await;
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .all(|notification| notification.message.contains("rejected")));
}

#[tokio::test]
async fn server_errors_are_mapped_to_store_errors() {
    let (client, _store) = spawn_store(vec![seller(
        "3",
        Requirements::all_submitted(),
        Duration::hours(2),
    )])
    .await;

    assert_eq!(
        client
            .update_status(&SellerId("3".to_string()), SellerStatus::Pending)
            .await,
        Err(StoreError::Invalid(
            "invalid request: status can only be set to accepted or rejected".to_string()
        ))
    );
    assert_eq!(client.fetch(&SellerId("404".to_string())).await, Ok(None));

    client
        .update_status(&SellerId("3".to_string()), SellerStatus::Accepted)
        .await
        .expect("first decision");
    match client
        .update_status(&SellerId("3".to_string()), SellerStatus::Rejected)
        .await
    {
        Err(StoreError::Conflict(message)) => assert!(message.contains("already accepted")),
        other => panic!("expected conflict, got {other:?}"),
    }
}
