//! Audience rules: a field, an operator legal for it, and one or two values.

use crate::fields::{FieldKey, Operator};
use promo_core::{PromoError, PromoResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a list of conditions combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchLogic {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub field: FieldKey,
    pub op: Operator,
    pub value: String,
    /// Upper bound, only meaningful for `between`.
    #[serde(default)]
    pub value2: String,
}

impl Rule {
    /// The starter rule: seven or more days since the last install.
    pub fn starter(id: Uuid) -> Self {
        Self {
            id,
            field: FieldKey::DaysSinceLastInstall,
            op: Operator::Gte,
            value: "7".to_string(),
            value2: String::new(),
        }
    }

    /// Fails when the operator is not legal for the rule's field.
    pub fn check_operator(&self) -> PromoResult<()> {
        ensure_operator(self.field, self.op)
    }

    /// Switch to another field, resetting the operator to that field's
    /// default and clearing both values.
    pub fn retarget(&mut self, field: FieldKey) {
        self.field = field;
        self.op = field.field_type().default_operator();
        self.value.clear();
        self.value2.clear();
    }

    /// True when the rule carries everything its operator needs.
    pub fn is_complete(&self) -> bool {
        match self.op {
            Operator::Between => {
                !self.value.trim().is_empty() && !self.value2.trim().is_empty()
            }
            _ => true,
        }
    }
}

pub(crate) fn ensure_operator(field: FieldKey, op: Operator) -> PromoResult<()> {
    if field.field_type().allows(op) {
        Ok(())
    } else {
        Err(PromoError::OperatorNotAllowed {
            field: field.to_string(),
            op: op.to_string(),
        })
    }
}
