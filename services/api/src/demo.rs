use crate::admin::{render_detail, render_notifications, render_seller_table};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use sea_merkado::error::AppError;
use sea_merkado::session::SessionContext;
use sea_merkado::workflows::notifications::collect_notifications;
use sea_merkado::workflows::sellers::domain::unique_id_for;
use sea_merkado::workflows::sellers::{
    ApprovalError, CompliancePolicy, FileUpload, MemorySellerStore,
    RequirementChecklist, RequirementKind, Requirements, SellerApprovalService, SellerId,
    SellerQuery, SellerRecord, SellerStatus,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Days a seller may stay incomplete before automatic rejection.
    #[arg(long)]
    pub(crate) deadline_days: Option<i64>,
    /// Skip the receipt portion of the demo.
    #[arg(long)]
    pub(crate) skip_receipt: bool,
}

fn sample_seller(
    id: &str,
    name: &str,
    requirements: Requirements,
    age: Duration,
    now: DateTime<Utc>,
) -> SellerRecord {
    let date_added = now - age;
    SellerRecord {
        id: SellerId(id.to_string()),
        unique_id: unique_id_for(date_added),
        name: name.to_string(),
        email: format!(
            "{}@merkado.demo",
            name.to_ascii_lowercase().replace(' ', ".")
        ),
        status: SellerStatus::Pending,
        requirements,
        files: Vec::new(),
        date_added,
    }
}

fn sample_sellers(now: DateTime<Utc>) -> Vec<SellerRecord> {
    let mut permit_only = Requirements::default();
    permit_only.set(RequirementKind::BusinessPermit, true);

    vec![
        sample_seller(
            "1",
            "Lambaklad Bangus Farm",
            Requirements::all_submitted(),
            Duration::hours(20),
            now,
        ),
        sample_seller(
            "2",
            "Tinapa ni Aling Nena",
            permit_only,
            Duration::days(4),
            now,
        ),
        sample_seller(
            "3",
            "Gensan Tuna Direct",
            Requirements::all_submitted(),
            Duration::days(5),
            now,
        ),
        sample_seller(
            "4",
            "Bicol Crab House",
            Requirements::default(),
            Duration::hours(30),
            now,
        ),
    ]
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        deadline_days,
        skip_receipt,
    } = args;

    let now = Utc::now();
    let policy = deadline_days
        .map(CompliancePolicy::new)
        .unwrap_or_default();
    let store = MemorySellerStore::shared(policy);
    for record in sample_sellers(now) {
        store.seed(record);
    }
    let service = SellerApprovalService::new(store.clone(), policy);
    let session = SessionContext::issue("demo-admin", "Demo Admin", now, Duration::minutes(30));

    println!(
        "Seller approval demo (deadline {} days)",
        policy.deadline_days()
    );
    println!("\nSeller table");
    render_seller_table(&service.list(&SellerQuery::default(), now).await?);

    println!("\nOpening Tinapa ni Aling Nena");
    let detail = service
        .check_requirements(&session, &SellerId("2".to_string()), now)
        .await?;
    render_detail(&detail);

    println!("\nAccepting Gensan Tuna Direct");
    match service
        .accept(&session, &SellerId("3".to_string()), now)
        .await
    {
        Ok(record) => println!("- {} accepted", record.name),
        Err(err @ ApprovalError::DeadlineExceeded { .. }) => println!("- {err}"),
        Err(err) => return Err(err.into()),
    }

    println!("\nCompleting and accepting Bicol Crab House");
    let uploaded = service
        .upload_file(
            &session,
            &SellerId("4".to_string()),
            RequirementKind::IdProof,
            FileUpload {
                file_name: "owner-id.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            },
            now,
        )
        .await?;
    let mut checklist = RequirementChecklist::from_record(&uploaded);
    checklist.toggle(RequirementKind::BarangayClearance);
    checklist.toggle(RequirementKind::BusinessPermit);
    service
        .save_requirements(&session, &mut checklist, now)
        .await?;
    let accepted = service
        .accept(&session, &SellerId("4".to_string()), now)
        .await?;
    println!("- {} accepted", accepted.name);

    println!("\nSeller table after review");
    render_seller_table(&service.list(&SellerQuery::default(), now).await?);

    println!("\nNotifications");
    render_notifications(&collect_notifications(store.as_ref(), Some(10)).await);

    if !skip_receipt {
        println!("\nReceipt");
        let receipt = service.receipt(&SellerId("2".to_string()), now).await?;
        print!("{}", receipt.render_text());
    }

    Ok(())
}
