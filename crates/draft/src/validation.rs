//! Validity of a draft. Invalid drafts can still be previewed and exported;
//! validity only gates campaign creation.

use crate::draft::{AudienceType, Draft, PromoType};
use crate::input::number_or;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    BlankName,
    MultiplierNotPositiveInteger,
    FixedAmountNotPositive,
    NoActions,
    NoAudienceRules,
    IncompleteBetween { rule_id: Uuid },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::BlankName => write!(f, "campaign name is blank"),
            ValidationIssue::MultiplierNotPositiveInteger => {
                write!(f, "multiplier must be a whole number of at least 1")
            }
            ValidationIssue::FixedAmountNotPositive => {
                write!(f, "fixed amount must be greater than 0")
            }
            ValidationIssue::NoActions => write!(f, "fixed payout needs at least one action"),
            ValidationIssue::NoAudienceRules => {
                write!(f, "dynamic audience needs at least one rule")
            }
            ValidationIssue::IncompleteBetween { rule_id } => {
                write!(f, "rule {rule_id} uses between but is missing a bound")
            }
        }
    }
}

/// Every reason the draft cannot be created, in a stable order.
pub fn validate(draft: &Draft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if draft.name.trim().is_empty() {
        issues.push(ValidationIssue::BlankName);
    }

    match draft.promo_type {
        PromoType::Multiplier => {
            let m = number_or(&draft.multiplier, 0.0);
            if !(m >= 1.0 && m.fract() == 0.0) {
                issues.push(ValidationIssue::MultiplierNotPositiveInteger);
            }
        }
        PromoType::Fixed => {
            if number_or(&draft.fixed_amount, 0.0) <= 0.0 {
                issues.push(ValidationIssue::FixedAmountNotPositive);
            }
            if draft.actions.is_empty() {
                issues.push(ValidationIssue::NoActions);
            }
        }
    }

    if draft.audience_type == AudienceType::Dynamic {
        if draft.rules.is_empty() {
            issues.push(ValidationIssue::NoAudienceRules);
        }
        issues.extend(
            draft
                .rules
                .iter()
                .filter(|r| !r.is_complete())
                .map(|r| ValidationIssue::IncompleteBetween { rule_id: r.id }),
        );
    }

    issues
}

pub fn is_valid(draft: &Draft) -> bool {
    validate(draft).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionType;
    use crate::fields::Operator;

    #[test]
    fn test_default_draft_is_valid() {
        assert!(is_valid(&Draft::default()));
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let mut draft = Draft::default();
        draft.set_name("");
        assert_eq!(validate(&draft), vec![ValidationIssue::BlankName]);
        draft.set_name("   \t");
        assert!(!is_valid(&draft));
    }

    #[test]
    fn test_multiplier_must_be_positive_integer() {
        let mut draft = Draft::default();
        draft.multiplier = "2.5".into();
        assert_eq!(
            validate(&draft),
            vec![ValidationIssue::MultiplierNotPositiveInteger]
        );

        draft.set_multiplier("0");
        assert!(!is_valid(&draft));

        draft.set_multiplier("");
        assert!(!is_valid(&draft));

        draft.set_multiplier("3");
        assert!(is_valid(&draft));
    }

    #[test]
    fn test_fixed_requires_amount_and_action() {
        let mut draft = Draft::default();
        draft.set_promo_type(PromoType::Fixed);
        draft.set_fixed_amount("100");
        assert_eq!(validate(&draft), vec![ValidationIssue::NoActions]);

        draft
            .add_action(Uuid::new_v4(), ActionType::SpendAnyGame)
            .unwrap();
        assert!(is_valid(&draft));

        draft.set_fixed_amount("0.0");
        assert_eq!(validate(&draft), vec![ValidationIssue::FixedAmountNotPositive]);
    }

    #[test]
    fn test_fixed_ignores_multiplier() {
        let mut draft = Draft::default();
        draft.set_multiplier("");
        draft.set_promo_type(PromoType::Fixed);
        draft
            .add_action(Uuid::new_v4(), ActionType::MilestonesExisting)
            .unwrap();
        assert!(is_valid(&draft));
    }

    #[test]
    fn test_dynamic_needs_rules() {
        let mut draft = Draft::default();
        let id = draft.rules()[0].id;
        draft.remove_rule(id).unwrap();
        assert_eq!(validate(&draft), vec![ValidationIssue::NoAudienceRules]);
    }

    #[test]
    fn test_static_audience_with_no_uids_is_valid() {
        let mut draft = Draft::default();
        let id = draft.rules()[0].id;
        draft.remove_rule(id).unwrap();
        draft.set_audience_type(AudienceType::Static);
        assert!(is_valid(&draft));
    }

    #[test]
    fn test_between_needs_second_bound() {
        let mut draft = Draft::default();
        let id = draft.rules()[0].id;
        draft.set_rule_op(id, Operator::Between).unwrap();
        assert_eq!(
            validate(&draft),
            vec![ValidationIssue::IncompleteBetween { rule_id: id }]
        );

        draft.set_rule_value2(id, "30").unwrap();
        assert!(is_valid(&draft));
    }

    #[test]
    fn test_value2_ignored_for_other_operators() {
        let mut draft = Draft::default();
        let id = draft.rules()[0].id;
        draft.set_rule_value2(id, "").unwrap();
        draft.set_rule_op(id, Operator::Lt).unwrap();
        assert!(is_valid(&draft));
    }

    #[test]
    fn test_issues_accumulate() {
        let mut draft = Draft::default();
        draft.set_name(" ");
        draft.set_promo_type(PromoType::Fixed);
        draft.set_fixed_amount("");
        assert_eq!(
            validate(&draft),
            vec![
                ValidationIssue::BlankName,
                ValidationIssue::FixedAmountNotPositive,
                ValidationIssue::NoActions,
            ]
        );
    }
}
