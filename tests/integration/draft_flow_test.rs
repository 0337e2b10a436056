//! End-to-end draft flows: edit, derive, validate, export, check.

#[cfg(test)]
mod tests {
    use promo_core::config::AppConfig;
    use promo_draft::*;
    use promo_integrations::{EligibilityChecker, MockEligibilityChecker};
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn session() -> DraftSession {
        DraftSession::new(Draft::new(&AppConfig::default().integrations))
    }

    fn payload_value(session: &DraftSession) -> Value {
        serde_json::to_value(session.payload()).unwrap()
    }

    #[test]
    fn test_blank_name_invalid_regardless_of_reward() {
        let mut s = session();
        s.apply_all(vec![
            DraftEdit::SetName { name: "".into() },
            DraftEdit::SetPromoType {
                promo_type: PromoType::Multiplier,
            },
            DraftEdit::SetMultiplier { value: "2".into() },
        ])
        .unwrap();
        assert!(!s.is_valid());
        assert_eq!(s.issues(), &[ValidationIssue::BlankName]);
    }

    #[test]
    fn test_fixed_campaign_flow() {
        let mut s = session();
        s.apply_all(vec![
            DraftEdit::SetName {
                name: "Install Rush".into(),
            },
            DraftEdit::SetPromoType {
                promo_type: PromoType::Fixed,
            },
            DraftEdit::SetFixedAmount {
                value: "100".into(),
            },
        ])
        .unwrap();
        assert!(!s.is_valid());

        let install = Uuid::new_v4();
        let spend = Uuid::new_v4();
        s.apply_all(vec![
            DraftEdit::AddAction {
                id: install,
                action_type: ActionType::InstallAndMilestones,
            },
            DraftEdit::AddAction {
                id: spend,
                action_type: ActionType::SpendAnyGame,
            },
            DraftEdit::UpdateAction {
                id: install,
                edit: ActionAttribute::MilestoneCount("3".into()),
            },
            DraftEdit::UpdateAction {
                id: spend,
                edit: ActionAttribute::Currency("eur".into()),
            },
            DraftEdit::SetActionsLogic {
                logic: MatchLogic::Any,
            },
        ])
        .unwrap();
        assert!(s.is_valid());

        let value = payload_value(&s);
        assert_eq!(value["type"], "fixed");
        assert_eq!(value["reward"], json!({ "fixed_points": 100 }));
        assert_eq!(
            value["actions"],
            json!({
                "logic": "ANY",
                "items": [
                    { "type": "install_and_milestones", "install_count": 1, "milestone_count": 3 },
                    { "type": "spend_any_game", "op": ">=", "amount": 1, "currency": "EUR" }
                ]
            })
        );

        s.apply(DraftEdit::RemoveAction { id: install }).unwrap();
        s.apply(DraftEdit::RemoveAction { id: spend }).unwrap();
        assert!(!s.is_valid());
    }

    #[test]
    fn test_static_audience_counts() {
        let mut s = session();
        let text = "a,b;c d\n\ne,,;f";
        s.apply_all(vec![
            DraftEdit::SetAudienceType {
                audience_type: AudienceType::Static,
            },
            DraftEdit::SetUidsText { text: text.into() },
        ])
        .unwrap();
        let uids = payload_value(&s)["audience"]["uids"].as_array().unwrap().len();
        assert_eq!(uids, 6);
        assert!(s.is_valid());
    }

    #[test]
    fn test_dynamic_rule_flow() {
        let mut s = session();
        let first = s.draft().rules()[0].id;
        let second = Uuid::new_v4();
        s.apply_all(vec![
            DraftEdit::AddRule { id: second },
            DraftEdit::SetRuleField {
                id: second,
                field: FieldKey::Country,
            },
            DraftEdit::SetRuleOp {
                id: second,
                rule_op: Operator::Ne,
            },
            DraftEdit::SetRuleValue {
                id: second,
                value: "US".into(),
            },
            DraftEdit::SetRuleOp {
                id: first,
                rule_op: Operator::Between,
            },
            DraftEdit::SetRuleValue2 {
                id: first,
                value: "30".into(),
            },
            DraftEdit::SetRuleLogic {
                logic: MatchLogic::Any,
            },
        ])
        .unwrap();

        assert!(s.is_valid());
        assert_eq!(
            payload_value(&s)["audience"],
            json!({
                "type": "dynamic",
                "logic": "ANY",
                "rules": [
                    { "field": "days_since_last_install", "op": "between", "value": "7", "value2": "30" },
                    { "field": "country", "op": "!=", "value": "US", "value2": "" }
                ]
            })
        );

        s.apply(DraftEdit::SetRuleField {
            id: first,
            field: FieldKey::LifetimeSpend,
        })
        .unwrap();
        let rule = s.draft().rule(first).unwrap();
        assert_eq!(rule.op, Operator::Gt);
        assert!(rule.value.is_empty() && rule.value2.is_empty());
    }

    #[test]
    fn test_export_matches_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.apply(DraftEdit::SetName {
            name: "Winter  Bonus".into(),
        })
        .unwrap();

        let path = export_to_dir(s.draft(), dir.path()).unwrap();
        assert!(path.ends_with("winter-bonus-config.json"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), s.preview().unwrap());
    }

    #[test]
    fn test_draft_file_survives_reload() {
        let mut s = session();
        s.apply(DraftEdit::SetCapsEnabled { enabled: false }).unwrap();
        let body = serde_json::to_string_pretty(s.draft()).unwrap();

        let reloaded: Draft = serde_json::from_str(&body).unwrap();
        reloaded.check().unwrap();
        let again = DraftSession::new(reloaded);
        assert_eq!(again.preview().unwrap(), s.preview().unwrap());
        assert_eq!(payload_value(&again)["caps"], Value::Null);
    }

    #[tokio::test]
    async fn test_mock_check_through_trait() {
        let checker: Box<dyn EligibilityChecker> = Box::new(MockEligibilityChecker::new(1.0));
        let s = session();
        let outcome = checker.check("user-123", s.payload()).await.unwrap();
        assert_eq!(outcome.to_string(), "user-123: Eligible - Eligible based on rules");
    }
}
