use crate::infra::{
    admin_session, guess_content_type, parse_display_status, parse_requirement, policy_from,
};
use chrono::Utc;
use clap::{Args, Subcommand};
use sea_merkado::config::AppConfig;
use sea_merkado::error::AppError;
use sea_merkado::telemetry;
use sea_merkado::workflows::notifications::{collect_notifications, Notification};
use sea_merkado::workflows::sellers::{
    ApiClient, FileUpload, NewSeller, RequirementChecklist, RequirementKind, SellerApprovalService,
    SellerDetail, SellerId, SellerQuery, SellerRecord, SellerSnapshot, SellerStatus, SellerStore,
    ToggleOutcome,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SellerArgs {
    /// Seller store base URL (defaults to MERKADO_API_URL)
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,
    /// Admin identifier recorded on privileged actions
    #[arg(long, global = true, default_value = "admin")]
    pub(crate) admin: String,
    #[command(subcommand)]
    pub(crate) command: SellerCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SellerCommand {
    /// List sellers with their live display status
    List(ListArgs),
    /// Open a seller: re-check requirements and show the detail view
    Show { seller_id: String },
    /// Accept a pending seller with complete requirements
    Accept { seller_id: String },
    /// Reject a pending seller
    Reject { seller_id: String },
    /// Toggle manual requirement flags and save them in one update
    Requirements(RequirementsArgs),
    /// Attach a document to a requirement (PDF or image)
    Upload {
        seller_id: String,
        #[arg(value_parser = parse_requirement)]
        requirement: RequirementKind,
        path: PathBuf,
    },
    /// Remove the document backing a requirement
    Remove {
        seller_id: String,
        #[arg(value_parser = parse_requirement)]
        requirement: RequirementKind,
    },
    /// Print a seller receipt, optionally exporting it as CSV
    Receipt {
        seller_id: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the merged admin notification feed
    Notifications {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Register a new seller (pending, no requirements)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Filter by display status (pending, accepted, rejected)
    #[arg(long, value_parser = parse_display_status)]
    pub(crate) status: Option<SellerStatus>,
    /// Case-insensitive match on seller code, name or email
    #[arg(long)]
    pub(crate) search: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RequirementsArgs {
    pub(crate) seller_id: String,
    /// Requirement to flip (repeatable): barangayClearance, businessPermit, idProof
    #[arg(long = "toggle", value_parser = parse_requirement, required = true)]
    pub(crate) toggles: Vec<RequirementKind>,
}

pub(crate) async fn run_sellers(args: SellerArgs) -> Result<(), AppError> {
    let SellerArgs {
        api_url,
        admin,
        command,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(url) = api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    telemetry::init(&config.telemetry)?;

    let client = Arc::new(ApiClient::new(&config.api)?);
    let service = SellerApprovalService::new(client, policy_from(&config));
    let now = Utc::now();
    let session = admin_session(&config, &admin, now);

    match command {
        SellerCommand::List(ListArgs { status, search }) => {
            let query = SellerQuery {
                display_status: status,
                search,
            };
            let sellers = service.list(&query, now).await?;
            render_seller_table(&sellers);
        }
        SellerCommand::Show { seller_id } => {
            let detail = service
                .check_requirements(&session, &SellerId(seller_id), now)
                .await?;
            render_detail(&detail);
        }
        SellerCommand::Accept { seller_id } => {
            let record = service.accept(&session, &SellerId(seller_id), now).await?;
            println!("{} ({}) accepted", record.name, record.unique_id);
        }
        SellerCommand::Reject { seller_id } => {
            let record = service.reject(&session, &SellerId(seller_id), now).await?;
            println!("{} ({}) rejected", record.name, record.unique_id);
        }
        SellerCommand::Requirements(RequirementsArgs { seller_id, toggles }) => {
            let detail = service
                .check_requirements(&session, &SellerId(seller_id), now)
                .await?;
            let mut checklist = RequirementChecklist::from_record(&detail.record);
            for kind in toggles {
                match checklist.toggle(kind) {
                    ToggleOutcome::Toggled { value } => {
                        println!("- {}: {}", kind.label(), if value { "checked" } else { "unchecked" })
                    }
                    ToggleOutcome::FileBacked => {
                        println!("- {}: backed by an uploaded file; unchanged", kind.label())
                    }
                    ToggleOutcome::Locked { status } => {
                        println!("- {}: seller is {status}; unchanged", kind.label())
                    }
                }
            }
            if checklist.is_dirty() {
                let record = service
                    .save_requirements(&session, &mut checklist, now)
                    .await?;
                println!("Requirements saved for {}", record.unique_id);
                render_requirements(&record);
            } else {
                println!("No requirement changes to save");
            }
        }
        SellerCommand::Upload {
            seller_id,
            requirement,
            path,
        } => {
            std::fs::metadata(&path)?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let upload = FileUpload {
                file_name,
                content_type: guess_content_type(&path),
            };
            let record = service
                .upload_file(&session, &SellerId(seller_id), requirement, upload, now)
                .await?;
            println!("Uploaded {} for {}", requirement.label(), record.unique_id);
            render_requirements(&record);
        }
        SellerCommand::Remove {
            seller_id,
            requirement,
        } => {
            let record = service
                .delete_file(&session, &SellerId(seller_id), requirement, now)
                .await?;
            println!("Removed {} file for {}", requirement.label(), record.unique_id);
            render_requirements(&record);
        }
        SellerCommand::Receipt { seller_id, csv } => {
            let receipt = service.receipt(&SellerId(seller_id), now).await?;
            match csv {
                Some(path) => {
                    receipt.write_csv(File::create(&path)?)?;
                    println!("Receipt for {} written to {}", receipt.unique_id, path.display());
                }
                None => print!("{}", receipt.render_text()),
            }
        }
        SellerCommand::Notifications { limit } => {
            let notifications = collect_notifications(service.store().as_ref(), Some(limit)).await;
            render_notifications(&notifications);
        }
        SellerCommand::Register { name, email } => {
            let record = service.store().register(NewSeller { name, email }).await?;
            println!("Registered {} as {}", record.name, record.unique_id);
        }
    }

    Ok(())
}

pub(crate) fn render_seller_table(sellers: &[SellerSnapshot]) {
    if sellers.is_empty() {
        println!("No sellers match the current filter");
        return;
    }

    println!(
        "{:<6} {:<22} {:<32} {:<10} {:>4}  missing",
        "id", "seller code", "name", "status", "days"
    );
    for snapshot in sellers {
        let record = &snapshot.record;
        let missing = snapshot
            .assessment
            .missing
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<6} {:<22} {:<32} {:<10} {:>4}  {}",
            record.id,
            record.unique_id,
            record.name,
            snapshot.assessment.display_status,
            snapshot.assessment.days_since_registration,
            if missing.is_empty() { "-" } else { missing.as_str() }
        );
    }
}

pub(crate) fn render_detail(detail: &SellerDetail) {
    let record = &detail.record;
    println!("{} ({})", record.name, record.unique_id);
    println!("- Email: {}", record.email);
    println!(
        "- Status: {} | {} days since registration (deadline {} days)",
        detail.assessment.display_status,
        detail.assessment.days_since_registration,
        detail.assessment.deadline_days
    );
    if detail.auto_rejected {
        println!("- Rejected automatically: requirements incomplete past the deadline");
    }
    render_requirements(record);
}

pub(crate) fn render_requirements(record: &SellerRecord) {
    for kind in RequirementKind::ALL {
        let mark = if record.requirements.get(kind) { "x" } else { " " };
        match record.file_for(kind) {
            Some(file) => println!("  [{mark}] {} ({})", kind.label(), file.file_name),
            None => println!("  [{mark}] {}", kind.label()),
        }
    }
}

pub(crate) fn render_notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications");
        return;
    }
    for notification in notifications {
        println!(
            "{} [{}] {}",
            notification.created_at.format("%Y-%m-%d %H:%M"),
            notification.feed,
            notification.message
        );
    }
}
