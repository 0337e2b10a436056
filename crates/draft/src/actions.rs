//! Unlock actions for fixed-point campaigns.

use crate::input::{ensure_sanitized, sanitize_currency, sanitize_decimal, sanitize_digits};
use promo_core::{PromoError, PromoResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    InstallAndMilestones,
    MilestonesExisting,
    SpendAnyGame,
}

/// Comparison used by a spend threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendOp {
    #[serde(rename = ">")]
    Gt,
    #[default]
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Install the game, then hit milestones.
    InstallAndMilestones {
        install_count: String,
        milestone_count: String,
    },
    /// Hit milestones in games already installed.
    MilestonesExisting { milestone_count: String },
    /// Spend in any game against a threshold.
    SpendAnyGame {
        op: SpendOp,
        amount: String,
        currency: String,
    },
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::InstallAndMilestones { .. } => ActionType::InstallAndMilestones,
            ActionKind::MilestonesExisting { .. } => ActionType::MilestonesExisting,
            ActionKind::SpendAnyGame { .. } => ActionType::SpendAnyGame,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::InstallAndMilestones { .. } => "Install + milestones",
            ActionKind::MilestonesExisting { .. } => "Milestones in existing installs",
            ActionKind::SpendAnyGame { .. } => "Spend in any game",
        }
    }
}

impl From<ActionType> for ActionKind {
    fn from(action_type: ActionType) -> Self {
        match action_type {
            ActionType::InstallAndMilestones => ActionKind::InstallAndMilestones {
                install_count: "1".to_string(),
                milestone_count: "1".to_string(),
            },
            ActionType::MilestonesExisting => ActionKind::MilestonesExisting {
                milestone_count: "1".to_string(),
            },
            ActionType::SpendAnyGame => ActionKind::SpendAnyGame {
                op: SpendOp::Gte,
                amount: "1.00".to_string(),
                currency: "USD".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(id: Uuid, action_type: ActionType) -> Self {
        Self {
            id,
            kind: action_type.into(),
        }
    }

    /// Apply a single attribute edit. Fails without touching the action when
    /// the attribute does not exist on this variant.
    pub fn update(&mut self, edit: ActionAttribute) -> PromoResult<()> {
        let attribute = edit.name();
        match (&mut self.kind, edit) {
            (
                ActionKind::InstallAndMilestones { install_count, .. },
                ActionAttribute::InstallCount(raw),
            ) => *install_count = sanitize_digits(&raw),
            (
                ActionKind::InstallAndMilestones {
                    milestone_count, ..
                }
                | ActionKind::MilestonesExisting { milestone_count },
                ActionAttribute::MilestoneCount(raw),
            ) => *milestone_count = sanitize_digits(&raw),
            (ActionKind::SpendAnyGame { op, .. }, ActionAttribute::SpendOp(new_op)) => *op = new_op,
            (ActionKind::SpendAnyGame { amount, .. }, ActionAttribute::Amount(raw)) => {
                *amount = sanitize_decimal(&raw)
            }
            (ActionKind::SpendAnyGame { currency, .. }, ActionAttribute::Currency(raw)) => {
                *currency = sanitize_currency(&raw)
            }
            _ => {
                return Err(PromoError::ActionAttribute {
                    id: self.id,
                    attribute: attribute.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Reject attribute text that the editing path could never have produced.
    pub fn check_cells(&self) -> PromoResult<()> {
        match &self.kind {
            ActionKind::InstallAndMilestones {
                install_count,
                milestone_count,
            } => {
                ensure_sanitized("install_count", install_count, sanitize_digits)?;
                ensure_sanitized("milestone_count", milestone_count, sanitize_digits)
            }
            ActionKind::MilestonesExisting { milestone_count } => {
                ensure_sanitized("milestone_count", milestone_count, sanitize_digits)
            }
            ActionKind::SpendAnyGame {
                amount, currency, ..
            } => {
                ensure_sanitized("amount", amount, sanitize_decimal)?;
                ensure_sanitized("currency", currency, sanitize_currency)?;
                if !currency.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(PromoError::InvalidCell {
                        cell: "currency".to_string(),
                        value: currency.clone(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// One editable attribute of an action, carrying its new raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum ActionAttribute {
    InstallCount(String),
    MilestoneCount(String),
    SpendOp(SpendOp),
    Amount(String),
    Currency(String),
}

impl ActionAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            ActionAttribute::InstallCount(_) => "install_count",
            ActionAttribute::MilestoneCount(_) => "milestone_count",
            ActionAttribute::SpendOp(_) => "op",
            ActionAttribute::Amount(_) => "amount",
            ActionAttribute::Currency(_) => "currency",
        }
    }
}
