//! Edit/view state machine for forms backed by a committed record.
//!
//! ```text
//! Viewing --begin_edit--> Editing --begin_save--> Saving --complete_save--> Viewing
//!    ^                       |  ^                    |
//!    +--------cancel---------+  +-----fail_save------+
//! ```
//!
//! Field mutation is only accepted while `Editing`; in any other mode it is a
//! no-op. Callers are expected to disable inputs outside `Editing` as well.

use crate::contract::model::{FarmDraft, FormMode, Profile, ProfileFields};

/// A committed record that can be edited through a separate draft shape.
pub trait Editable: Clone {
    type Draft: Clone;

    fn to_draft(&self) -> Self::Draft;
}

impl Editable for Profile {
    type Draft = ProfileFields;

    fn to_draft(&self) -> ProfileFields {
        self.fields()
    }
}

/// The new-farm form has no committed record; its "committed" value is the
/// blank form it resets to.
impl Editable for FarmDraft {
    type Draft = FarmDraft;

    fn to_draft(&self) -> FarmDraft {
        self.clone()
    }
}

#[derive(Debug, Clone)]
pub struct FormController<T: Editable> {
    mode: FormMode,
    committed: T,
    draft: Option<T::Draft>,
}

impl<T: Editable> FormController<T> {
    pub fn new(committed: T) -> Self {
        Self {
            mode: FormMode::Viewing,
            committed,
            draft: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn draft(&self) -> Option<&T::Draft> {
        self.draft.as_ref()
    }

    /// `Viewing -> Editing`: copy the committed record into the draft buffer.
    pub fn begin_edit(&mut self) -> bool {
        if self.mode != FormMode::Viewing {
            return false;
        }
        self.draft = Some(self.committed.to_draft());
        self.mode = FormMode::Editing;
        true
    }

    /// Mutate the draft. Ignored unless `Editing`.
    pub fn edit(&mut self, f: impl FnOnce(&mut T::Draft)) -> bool {
        match (self.mode, self.draft.as_mut()) {
            (FormMode::Editing, Some(draft)) => {
                f(draft);
                true
            }
            _ => false,
        }
    }

    /// `Editing -> Viewing`: discard the draft.
    pub fn cancel(&mut self) -> bool {
        if self.mode != FormMode::Editing {
            return false;
        }
        self.draft = None;
        self.mode = FormMode::Viewing;
        true
    }

    /// `Editing -> Saving`: hand out the draft to submit. The draft stays in
    /// place until the save resolves.
    pub fn begin_save(&mut self) -> Option<T::Draft> {
        if self.mode != FormMode::Editing {
            return None;
        }
        let draft = self.draft.clone()?;
        self.mode = FormMode::Saving;
        Some(draft)
    }

    /// `Saving -> Viewing`: the backend's row replaces the committed record.
    pub fn complete_save(&mut self, saved: T) -> bool {
        if self.mode != FormMode::Saving {
            return false;
        }
        self.committed = saved;
        self.draft = None;
        self.mode = FormMode::Viewing;
        true
    }

    /// `Saving -> Editing`: keep the draft so the user can correct or retry.
    pub fn fail_save(&mut self) -> bool {
        if self.mode != FormMode::Saving {
            return false;
        }
        self.mode = FormMode::Editing;
        true
    }

    /// Replace the committed record from a remote refresh. An open draft is
    /// left untouched.
    pub fn replace_committed(&mut self, committed: T) {
        self.committed = committed;
    }

    /// Apply a remote change to the committed record and, when present, to
    /// the open draft.
    pub fn reconcile(
        &mut self,
        on_committed: impl FnOnce(&mut T),
        on_draft: impl FnOnce(&mut T::Draft),
    ) {
        on_committed(&mut self.committed);
        if let Some(draft) = self.draft.as_mut() {
            on_draft(draft);
        }
    }
}
