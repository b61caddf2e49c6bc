use std::collections::BTreeMap;

use super::domain::{RequirementFile, RequirementKind, Requirements, SellerId, SellerRecord, SellerStatus};

/// Outcome of a manual toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled { value: bool },
    /// The flag follows an uploaded file and cannot be edited directly.
    FileBacked,
    /// The seller is no longer pending.
    Locked { status: SellerStatus },
}

/// Client-side batch of requirement edits, saved in one write.
#[derive(Debug, Clone)]
pub struct RequirementChecklist {
    seller_id: SellerId,
    status: SellerStatus,
    saved: Requirements,
    current: Requirements,
    files: BTreeMap<RequirementKind, RequirementFile>,
}

impl RequirementChecklist {
    pub fn from_record(record: &SellerRecord) -> Self {
        let files = record
            .files
            .iter()
            .map(|file| (file.requirement, file.clone()))
            .collect();

        Self {
            seller_id: record.id.clone(),
            status: record.status,
            saved: record.requirements,
            current: record.requirements,
            files,
        }
    }

    pub fn seller_id(&self) -> &SellerId {
        &self.seller_id
    }

    pub fn status(&self) -> SellerStatus {
        self.status
    }

    pub fn requirements(&self) -> Requirements {
        self.current
    }

    pub fn file(&self, kind: RequirementKind) -> Option<&RequirementFile> {
        self.files.get(&kind)
    }

    pub fn is_file_backed(&self, kind: RequirementKind) -> bool {
        self.files.contains_key(&kind)
    }

    pub fn toggle(&mut self, kind: RequirementKind) -> ToggleOutcome {
        if self.is_file_backed(kind) {
            return ToggleOutcome::FileBacked;
        }
        if self.status != SellerStatus::Pending {
            return ToggleOutcome::Locked {
                status: self.status,
            };
        }

        let value = !self.current.get(kind);
        self.current.set(kind, value);
        ToggleOutcome::Toggled { value }
    }

    /// Record a persisted upload; the flag is forced on.
    pub fn attach_file(&mut self, file: RequirementFile) {
        let kind = file.requirement;
        self.files.insert(kind, file);
        self.saved.set(kind, true);
        self.current.set(kind, true);
    }

    /// Record a persisted deletion; the flag is forced off.
    pub fn detach_file(&mut self, kind: RequirementKind) -> Option<RequirementFile> {
        let removed = self.files.remove(&kind);
        self.saved.set(kind, false);
        self.current.set(kind, false);
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.saved != self.current
    }

    /// Flags to persist, or `None` when nothing changed since the last save.
    pub fn pending_update(&self) -> Option<Requirements> {
        self.is_dirty().then_some(self.current)
    }

    pub fn mark_saved(&mut self) {
        self.saved = self.current;
    }

    pub fn discard(&mut self) {
        self.current = self.saved;
    }
}
