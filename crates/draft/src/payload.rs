//! Canonical JSON payload derived from a draft.
//!
//! Key order follows struct declaration order, so the same draft always
//! serializes to the same bytes.

use crate::actions::{ActionKind, SpendOp};
use crate::draft::{AudienceType, CostMode, Draft, PromoType, Schedule};
use crate::fields::{FieldKey, Operator};
use crate::input::{coerce_json_number, split_uids};
use crate::rules::MatchLogic;
use serde::Serialize;
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub name: String,
    pub schedule: SchedulePayload,
    #[serde(rename = "type")]
    pub promo_type: PromoType,
    pub reward: RewardPayload,
    pub audience: AudiencePayload,
    pub cost_handling: CostHandlingPayload,
    pub caps: Option<CapsPayload>,
    pub constraints: ConstraintsPayload,
    pub integrations: IntegrationsPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionsPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePayload {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RewardPayload {
    Multiplier { multiplier: Number },
    Fixed { fixed_points: Number },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudiencePayload {
    Static {
        uids: Vec<String>,
    },
    Dynamic {
        logic: MatchLogic,
        rules: Vec<RulePayload>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulePayload {
    pub field: FieldKey,
    pub op: Operator,
    pub value: String,
    pub value2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CostHandlingPayload {
    PublisherAbsorbs,
    BalanceToMargin { target_margin_pct: Number },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapsPayload {
    pub per_user_points: Number,
    pub total_points: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintsPayload {
    pub non_boosted_milestones_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationsPayload {
    pub eligibility_api: EndpointPayload,
    pub event_webhook: EndpointPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointPayload {
    pub method: HttpMethod,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionsPayload {
    pub logic: MatchLogic,
    pub items: Vec<ActionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    InstallAndMilestones {
        install_count: Number,
        milestone_count: Number,
    },
    MilestonesExisting {
        milestone_count: Number,
    },
    SpendAnyGame {
        op: SpendOp,
        amount: Number,
        currency: String,
    },
}

impl From<&ActionKind> for ActionPayload {
    fn from(kind: &ActionKind) -> Self {
        match kind {
            ActionKind::InstallAndMilestones {
                install_count,
                milestone_count,
            } => ActionPayload::InstallAndMilestones {
                install_count: coerce_json_number(install_count),
                milestone_count: coerce_json_number(milestone_count),
            },
            ActionKind::MilestonesExisting { milestone_count } => {
                ActionPayload::MilestonesExisting {
                    milestone_count: coerce_json_number(milestone_count),
                }
            }
            ActionKind::SpendAnyGame {
                op,
                amount,
                currency,
            } => ActionPayload::SpendAnyGame {
                op: *op,
                amount: coerce_json_number(amount),
                currency: currency.clone(),
            },
        }
    }
}

/// Derive the payload from the current draft.
pub fn derive_payload(draft: &Draft) -> Payload {
    let reward = match draft.promo_type {
        PromoType::Multiplier => RewardPayload::Multiplier {
            multiplier: coerce_json_number(&draft.multiplier),
        },
        PromoType::Fixed => RewardPayload::Fixed {
            fixed_points: coerce_json_number(&draft.fixed_amount),
        },
    };

    let audience = match draft.audience_type {
        AudienceType::Static => AudiencePayload::Static {
            uids: split_uids(&draft.uids_text),
        },
        AudienceType::Dynamic => AudiencePayload::Dynamic {
            logic: draft.rule_logic,
            rules: draft
                .rules
                .iter()
                .map(|r| RulePayload {
                    field: r.field,
                    op: r.op,
                    value: r.value.clone(),
                    value2: r.value2.clone(),
                })
                .collect(),
        },
    };

    let cost_handling = match draft.cost_mode {
        CostMode::PublisherAbsorbs => CostHandlingPayload::PublisherAbsorbs,
        CostMode::BalanceToMargin => CostHandlingPayload::BalanceToMargin {
            target_margin_pct: coerce_json_number(&draft.target_margin),
        },
    };

    let caps = draft.caps.enabled.then(|| CapsPayload {
        per_user_points: coerce_json_number(&draft.caps.per_user_points),
        total_points: coerce_json_number(&draft.caps.total_points),
    });

    let actions = (draft.promo_type == PromoType::Fixed).then(|| ActionsPayload {
        logic: draft.actions_logic,
        items: draft.actions.iter().map(|a| (&a.kind).into()).collect(),
    });

    Payload {
        name: draft.name.clone(),
        schedule: SchedulePayload {
            start: draft.schedule.start.as_ref().map(Schedule::format),
            end: draft.schedule.end.as_ref().map(Schedule::format),
        },
        promo_type: draft.promo_type,
        reward,
        audience,
        cost_handling,
        caps,
        constraints: ConstraintsPayload {
            non_boosted_milestones_only: draft.non_boosted_only,
        },
        integrations: IntegrationsPayload {
            eligibility_api: EndpointPayload {
                method: HttpMethod::Post,
                url: draft.integrations.eligibility_url.clone(),
            },
            event_webhook: EndpointPayload {
                method: HttpMethod::Post,
                url: draft.integrations.webhook_url.clone(),
            },
        },
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionAttribute, ActionType};
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn payload_value(draft: &Draft) -> Value {
        serde_json::to_value(derive_payload(draft)).unwrap()
    }

    #[test]
    fn test_default_payload_snapshot() {
        let draft = Draft::default();
        let rule_field = draft.rules()[0].field;
        let value = payload_value(&draft);
        assert_eq!(
            value,
            json!({
                "name": "August Super Weekend",
                "schedule": { "start": null, "end": null },
                "type": "multiplier",
                "reward": { "multiplier": 2 },
                "audience": {
                    "type": "dynamic",
                    "logic": "ALL",
                    "rules": [
                        { "field": rule_field.as_str(), "op": ">=", "value": "7", "value2": "" }
                    ]
                },
                "cost_handling": { "mode": "publisher_absorbs" },
                "caps": { "per_user_points": 1000, "total_points": 100000 },
                "constraints": { "non_boosted_milestones_only": true },
                "integrations": {
                    "eligibility_api": { "method": "POST", "url": "https://api.publisher.com/promo/eligibility" },
                    "event_webhook": { "method": "POST", "url": "https://api.publisher.com/promo/webhook" }
                }
            })
        );
    }

    #[test]
    fn test_top_level_key_order() {
        let mut draft = Draft::default();
        draft.set_promo_type(PromoType::Fixed);
        let json = serde_json::to_string(&derive_payload(&draft)).unwrap();
        let keys = [
            "\"name\"",
            "\"schedule\"",
            "\"type\"",
            "\"reward\"",
            "\"audience\"",
            "\"cost_handling\"",
            "\"caps\"",
            "\"constraints\"",
            "\"integrations\"",
            "\"actions\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reward_shape_follows_type() {
        let mut draft = Draft::default();
        draft.set_fixed_amount("250");
        assert_eq!(payload_value(&draft)["reward"], json!({ "multiplier": 2 }));

        draft.set_promo_type(PromoType::Fixed);
        assert_eq!(payload_value(&draft)["reward"], json!({ "fixed_points": 250 }));
    }

    #[test]
    fn test_actions_only_for_fixed() {
        let mut draft = Draft::default();
        draft
            .add_action(Uuid::new_v4(), ActionType::MilestonesExisting)
            .unwrap();
        assert!(payload_value(&draft).get("actions").is_none());

        draft.set_promo_type(PromoType::Fixed);
        assert_eq!(
            payload_value(&draft)["actions"],
            json!({ "logic": "ALL", "items": [{ "type": "milestones_existing", "milestone_count": 1 }] })
        );
    }

    #[test]
    fn test_action_numbers_are_coerced() {
        let mut draft = Draft::default();
        draft.set_promo_type(PromoType::Fixed);
        let install = Uuid::new_v4();
        let spend = Uuid::new_v4();
        draft
            .add_action(install, ActionType::InstallAndMilestones)
            .unwrap();
        draft.add_action(spend, ActionType::SpendAnyGame).unwrap();
        draft
            .update_action(install, ActionAttribute::InstallCount(String::new()))
            .unwrap();
        draft
            .update_action(spend, ActionAttribute::Amount("4.50".into()))
            .unwrap();

        let items = &payload_value(&draft)["actions"]["items"];
        assert_eq!(
            items[0],
            json!({ "type": "install_and_milestones", "install_count": 0, "milestone_count": 1 })
        );
        assert_eq!(
            items[1],
            json!({ "type": "spend_any_game", "op": ">=", "amount": 4.5, "currency": "USD" })
        );
    }

    #[test]
    fn test_static_audience_splits_uids() {
        let mut draft = Draft::default();
        draft.set_audience_type(AudienceType::Static);
        draft.set_uids_text("u1, u2;u3\n\nu4 u5");
        assert_eq!(
            payload_value(&draft)["audience"],
            json!({ "type": "static", "uids": ["u1", "u2", "u3", "u4", "u5"] })
        );
    }

    #[test]
    fn test_caps_disabled_is_null() {
        let mut draft = Draft::default();
        draft.set_caps_enabled(false);
        assert_eq!(payload_value(&draft)["caps"], Value::Null);
    }

    #[test]
    fn test_balance_to_margin_coerces() {
        let mut draft = Draft::default();
        draft.set_cost_mode(CostMode::BalanceToMargin);
        draft.set_target_margin("...");
        assert_eq!(
            payload_value(&draft)["cost_handling"],
            json!({ "mode": "balance_to_margin", "target_margin_pct": 0 })
        );
        draft.set_target_margin("12.5");
        assert_eq!(
            payload_value(&draft)["cost_handling"]["target_margin_pct"],
            json!(12.5)
        );
    }

    #[test]
    fn test_schedule_rendering() {
        let mut draft = Draft::default();
        draft.set_schedule_start("2025-08-01T10:00").unwrap();
        assert_eq!(
            payload_value(&draft)["schedule"],
            json!({ "start": "2025-08-01T10:00", "end": null })
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let mut draft = Draft::default();
        draft.set_audience_type(AudienceType::Static);
        draft.set_uids_text("b a c");
        let first = serde_json::to_string_pretty(&derive_payload(&draft)).unwrap();
        let second = serde_json::to_string_pretty(&derive_payload(&draft)).unwrap();
        assert_eq!(first, second);
    }
}
