//! Role-tagged upload slots

use super::file::FileHandle;
use super::validator::FileValidator;
use crate::types::Role;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One role's slot: the accepted file and the latest violations
#[derive(Clone, Debug)]
pub struct UploadSlot {
    role: Role,
    file: Option<FileHandle>,
    errors: Vec<String>,
}

impl UploadSlot {
    fn empty(role: Role) -> Self {
        Self {
            role,
            file: None,
            errors: Vec::new(),
        }
    }

    /// Role this slot belongs to
    pub fn role(&self) -> Role {
        self.role
    }

    /// Accepted file, if any
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    /// Violations from the latest assignment or content pass
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Holds a file and carries no violations
    pub fn is_ready(&self) -> bool {
        self.file.is_some() && self.errors.is_empty()
    }
}

/// The three role-tagged files required to start a session
///
/// Violations are keyed by role, so assigning one role never touches another.
/// A rejected candidate does not displace the previously accepted file, but
/// its violations stay on the slot until the role is re-assigned or cleared.
#[derive(Clone, Debug)]
pub struct UploadBatch {
    slots: [UploadSlot; 3],
    validator: FileValidator,
}

impl Default for UploadBatch {
    fn default() -> Self {
        Self::new(FileValidator::default())
    }
}

impl UploadBatch {
    /// Create an empty batch
    pub fn new(validator: FileValidator) -> Self {
        Self {
            slots: Role::ALL.map(UploadSlot::empty),
            validator,
        }
    }

    /// Assign a file to a role
    ///
    /// Returns the violations found; an empty list means the file was stored.
    pub fn assign(&mut self, role: Role, file: FileHandle) -> Vec<String> {
        let violations = self.validator.validate(&file);
        let slot = &mut self.slots[role.index()];

        if violations.is_empty() {
            debug!(%role, name = file.name(), size_bytes = file.size_bytes(), "file accepted");
            slot.file = Some(file);
            slot.errors.clear();
        } else {
            debug!(%role, name = file.name(), ?violations, "file rejected");
            slot.errors = violations.clone();
        }

        violations
    }

    /// Empty one role's slot
    pub fn clear(&mut self, role: Role) {
        self.slots[role.index()] = UploadSlot::empty(role);
    }

    /// Empty every slot
    pub fn reset(&mut self) {
        for role in Role::ALL {
            self.clear(role);
        }
        debug!("upload batch reset");
    }

    /// Every role holds a file and no slot carries violations
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(UploadSlot::is_ready)
    }

    /// Roles blocking submission, in role order
    pub fn missing_roles(&self) -> Vec<Role> {
        self.slots
            .iter()
            .filter(|slot| !slot.is_ready())
            .map(UploadSlot::role)
            .collect()
    }

    /// Slot for a role
    pub fn slot(&self, role: Role) -> &UploadSlot {
        &self.slots[role.index()]
    }

    /// Accepted file for a role
    pub fn file(&self, role: Role) -> Option<&FileHandle> {
        self.slot(role).file()
    }

    /// Every recorded violation, tagged with its role
    pub fn violations(&self) -> Vec<(Role, &str)> {
        self.slots
            .iter()
            .flat_map(|slot| slot.errors.iter().map(move |e| (slot.role, e.as_str())))
            .collect()
    }

    /// Run the content checks on every assigned file
    ///
    /// Files are read in role order. Violations are recorded on the owning
    /// slot, which then blocks submission until the role is re-assigned.
    /// Empty roles get a "file is required" entry in the result but no slot
    /// violation.
    pub async fn check_contents(&mut self) -> BTreeMap<Role, Vec<String>> {
        let mut report = BTreeMap::new();

        for role in Role::ALL {
            let Some(file) = self.slots[role.index()].file.clone() else {
                report.insert(role, vec![format!("{} file is required", role.description())]);
                continue;
            };

            let violations = self.validator.validate_content(&file).await;
            if !violations.is_empty() {
                info!(%role, name = file.name(), count = violations.len(), "content checks failed");
                self.slots[role.index()].errors = violations.clone();
                report.insert(role, violations);
            }
        }

        report
    }
}
