use super::common::*;
use crate::workflows::sellers::checklist::{RequirementChecklist, ToggleOutcome};
use crate::workflows::sellers::domain::{RequirementKind, Requirements, SellerStatus};
use chrono::Duration;

#[test]
fn toggles_are_batched_until_saved() {
    let record = pending("1", Requirements::default(), Duration::days(1));
    let mut checklist = RequirementChecklist::from_record(&record);

    assert_eq!(
        checklist.toggle(RequirementKind::BusinessPermit),
        ToggleOutcome::Toggled { value: true }
    );
    assert_eq!(
        checklist.toggle(RequirementKind::IdProof),
        ToggleOutcome::Toggled { value: true }
    );
    assert!(checklist.is_dirty());

    let update = checklist.pending_update().expect("changes pending");
    assert!(update.business_permit && update.id_proof && !update.barangay_clearance);

    checklist.mark_saved();
    assert!(checklist.pending_update().is_none());
}

#[test]
fn toggling_back_to_saved_value_is_not_dirty() {
    let record = pending("1", Requirements::default(), Duration::days(1));
    let mut checklist = RequirementChecklist::from_record(&record);

    checklist.toggle(RequirementKind::BarangayClearance);
    checklist.toggle(RequirementKind::BarangayClearance);
    assert!(!checklist.is_dirty());

    checklist.toggle(RequirementKind::IdProof);
    checklist.discard();
    assert_eq!(checklist.requirements(), Requirements::default());
}

#[test]
fn file_backed_flags_ignore_toggles_regardless_of_status() {
    for status in [
        SellerStatus::Pending,
        SellerStatus::Accepted,
        SellerStatus::Rejected,
    ] {
        let mut record = seller(
            "1",
            status,
            only(&[RequirementKind::BusinessPermit]),
            Duration::days(1),
        );
        record
            .files
            .push(file(RequirementKind::BusinessPermit, "permit.pdf"));
        let mut checklist = RequirementChecklist::from_record(&record);

        assert_eq!(
            checklist.toggle(RequirementKind::BusinessPermit),
            ToggleOutcome::FileBacked
        );
        assert!(checklist.requirements().business_permit);
        assert!(!checklist.is_dirty());
    }
}

#[test]
fn finalized_sellers_lock_manual_toggles() {
    let record = seller(
        "1",
        SellerStatus::Accepted,
        Requirements::all_submitted(),
        Duration::days(1),
    );
    let mut checklist = RequirementChecklist::from_record(&record);

    assert_eq!(
        checklist.toggle(RequirementKind::IdProof),
        ToggleOutcome::Locked {
            status: SellerStatus::Accepted
        }
    );
    assert_eq!(checklist.requirements(), Requirements::all_submitted());
}

#[test]
fn upload_forces_flag_on_and_delete_forces_it_off() {
    let record = pending("1", Requirements::default(), Duration::hours(5));
    let mut checklist = RequirementChecklist::from_record(&record);
    assert!(!checklist.requirements().barangay_clearance);

    checklist.attach_file(file(RequirementKind::BarangayClearance, "clearance.pdf"));
    assert!(checklist.requirements().barangay_clearance);
    assert!(checklist.is_file_backed(RequirementKind::BarangayClearance));
    assert!(!checklist.is_dirty());

    let removed = checklist
        .detach_file(RequirementKind::BarangayClearance)
        .expect("file was attached");
    assert_eq!(removed.file_name, "clearance.pdf");
    assert!(!checklist.requirements().barangay_clearance);
    assert_eq!(
        checklist.toggle(RequirementKind::BarangayClearance),
        ToggleOutcome::Toggled { value: true }
    );
}
