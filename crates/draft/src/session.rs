//! Draft session: owns the single draft being edited and keeps the derived
//! payload and validity in step with it.

use crate::draft::{Draft, DraftEdit};
use crate::payload::{derive_payload, Payload};
use crate::validation::{validate, ValidationIssue};
use promo_core::PromoResult;
use tracing::{debug, warn};

pub struct DraftSession {
    draft: Draft,
    payload: Payload,
    issues: Vec<ValidationIssue>,
}

impl DraftSession {
    pub fn new(draft: Draft) -> Self {
        let payload = derive_payload(&draft);
        let issues = validate(&draft);
        Self {
            draft,
            payload,
            issues,
        }
    }

    /// Apply an edit and re-derive. A rejected edit changes nothing.
    pub fn apply(&mut self, edit: DraftEdit) -> PromoResult<()> {
        let kind = edit.kind();
        if let Err(e) = self.draft.apply(edit) {
            warn!(edit = kind, error = %e, "Edit rejected");
            metrics::counter!("promo.draft.edits_rejected", "edit" => kind).increment(1);
            return Err(e);
        }

        self.refresh();
        metrics::counter!("promo.draft.edits", "edit" => kind).increment(1);
        debug!(
            edit = kind,
            valid = self.is_valid(),
            issues = self.issues.len(),
            "Edit applied"
        );
        Ok(())
    }

    /// Apply edits in order, stopping at the first rejected one.
    pub fn apply_all<I>(&mut self, edits: I) -> PromoResult<()>
    where
        I: IntoIterator<Item = DraftEdit>,
    {
        for edit in edits {
            self.apply(edit)?;
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.payload = derive_payload(&self.draft);
        self.issues = validate(&self.draft);
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Gates the create action.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Live preview text: the payload as indented JSON.
    pub fn preview(&self) -> PromoResult<String> {
        Ok(serde_json::to_string_pretty(&self.payload)?)
    }

    pub fn into_draft(self) -> Draft {
        self.draft
    }
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new(Draft::default())
    }
}
