//! Seller onboarding approval: compliance derivation, requirement tracking,
//! the approval service and the seller store boundary.

pub mod checklist;
pub mod client;
pub mod compliance;
pub mod domain;
pub mod receipt;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use checklist::{RequirementChecklist, ToggleOutcome};
pub use client::ApiClient;
pub use compliance::{
    derive_status, elapsed_days, ComplianceAssessment, ComplianceGuard, CompliancePolicy,
    ComplianceViolation, DEFAULT_DEADLINE_DAYS,
};
pub use domain::{
    FileUpload, NewSeller, RequirementFile, RequirementKind, Requirements, SellerId,
    SellerRecord, SellerStatus,
};
pub use receipt::SellerReceipt;
pub use router::seller_router;
pub use service::{ApprovalError, SellerApprovalService, SellerDetail, SellerQuery, SellerSnapshot};
pub use store::{MemorySellerStore, SellerStore, StoreError};
