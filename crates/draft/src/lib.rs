//! Campaign draft model: editable draft state, payload derivation,
//! validation and export.

pub mod actions;
pub mod draft;
pub mod export;
pub mod fields;
pub mod input;
pub mod payload;
pub mod rules;
pub mod session;
pub mod validation;

pub use actions::{Action, ActionAttribute, ActionKind, ActionType, SpendOp};
pub use draft::{AudienceType, CostMode, Draft, DraftEdit, PromoType};
pub use export::{export_file_name, export_json, export_to_dir};
pub use fields::{FieldKey, FieldType, Operator, FIELDS};
pub use payload::{derive_payload, Payload};
pub use rules::{MatchLogic, Rule};
pub use session::DraftSession;
pub use validation::{is_valid, validate, ValidationIssue};
