//! Editable campaign draft. Every edit replaces exactly one cell, or one
//! element of the rule or action list located by its id.

use crate::actions::{Action, ActionAttribute, ActionType};
use crate::fields::{FieldKey, Operator};
use crate::input::{ensure_sanitized, sanitize_decimal, sanitize_digits};
use crate::rules::{ensure_operator, MatchLogic, Rule};
use chrono::{NaiveDateTime, Timelike};
use promo_core::config::IntegrationsConfig;
use promo_core::{PromoError, PromoResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TIMESTAMP_MINUTES: &str = "%Y-%m-%dT%H:%M";
const TIMESTAMP_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

// ─── Cell Types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    #[default]
    Multiplier,
    Fixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceType {
    Static,
    #[default]
    Dynamic,
}

/// Who pays for the promotional points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    #[default]
    PublisherAbsorbs,
    BalanceToMargin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl Schedule {
    /// Render a bound the way a datetime-local input writes it.
    pub fn format(ts: &NaiveDateTime) -> String {
        if ts.second() == 0 {
            ts.format(TIMESTAMP_MINUTES).to_string()
        } else {
            ts.format(TIMESTAMP_SECONDS).to_string()
        }
    }
}

/// Parse a schedule bound. Blank text clears the bound.
pub fn parse_timestamp(raw: &str) -> PromoResult<Option<NaiveDateTime>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_MINUTES)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, TIMESTAMP_SECONDS))
        .map(Some)
        .map_err(|_| PromoError::Timestamp(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caps {
    pub enabled: bool,
    pub per_user_points: String,
    pub total_points: String,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            enabled: true,
            per_user_points: "1000".to_string(),
            total_points: "100000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrations {
    pub eligibility_url: String,
    pub webhook_url: String,
}

impl From<&IntegrationsConfig> for Integrations {
    fn from(config: &IntegrationsConfig) -> Self {
        Self {
            eligibility_url: config.eligibility_url.clone(),
            webhook_url: config.webhook_url.clone(),
        }
    }
}

// ─── Draft ──────────────────────────────────────────────────────────────────

/// The full editable state of a campaign before export.
///
/// Reward, audience and cost cells are independent: switching a mode keeps
/// the cells of the other mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub(crate) name: String,
    pub(crate) promo_type: PromoType,
    pub(crate) multiplier: String,
    pub(crate) fixed_amount: String,
    #[serde(default)]
    pub(crate) schedule: Schedule,
    pub(crate) audience_type: AudienceType,
    #[serde(default)]
    pub(crate) uids_text: String,
    #[serde(default)]
    pub(crate) rules: Vec<Rule>,
    #[serde(default)]
    pub(crate) rule_logic: MatchLogic,
    #[serde(default)]
    pub(crate) cost_mode: CostMode,
    #[serde(default = "default_target_margin")]
    pub(crate) target_margin: String,
    #[serde(default)]
    pub(crate) caps: Caps,
    #[serde(default = "default_non_boosted_only")]
    pub(crate) non_boosted_only: bool,
    pub(crate) integrations: Integrations,
    #[serde(default)]
    pub(crate) actions_logic: MatchLogic,
    #[serde(default)]
    pub(crate) actions: Vec<Action>,
}

fn default_target_margin() -> String {
    "20".to_string()
}

fn default_non_boosted_only() -> bool {
    true
}

impl Draft {
    /// A fresh draft seeded with the starter values and the configured
    /// integration endpoints.
    pub fn new(integrations: &IntegrationsConfig) -> Self {
        Self {
            name: "August Super Weekend".to_string(),
            promo_type: PromoType::Multiplier,
            multiplier: "2".to_string(),
            fixed_amount: "100".to_string(),
            schedule: Schedule::default(),
            audience_type: AudienceType::Dynamic,
            uids_text: String::new(),
            rules: vec![Rule::starter(Uuid::new_v4())],
            rule_logic: MatchLogic::All,
            cost_mode: CostMode::PublisherAbsorbs,
            target_margin: default_target_margin(),
            caps: Caps::default(),
            non_boosted_only: default_non_boosted_only(),
            integrations: integrations.into(),
            actions_logic: MatchLogic::All,
            actions: Vec::new(),
        }
    }

    /// Check the invariants a loaded draft must hold: legal operators,
    /// unique ids, and numeric or currency cells in their sanitized form.
    pub fn check(&self) -> PromoResult<()> {
        ensure_sanitized("multiplier", &self.multiplier, sanitize_digits)?;
        ensure_sanitized("fixed_amount", &self.fixed_amount, sanitize_decimal)?;
        ensure_sanitized("target_margin", &self.target_margin, sanitize_decimal)?;
        ensure_sanitized("per_user_points", &self.caps.per_user_points, sanitize_decimal)?;
        ensure_sanitized("total_points", &self.caps.total_points, sanitize_decimal)?;

        let mut seen = std::collections::HashSet::new();
        for rule in &self.rules {
            rule.check_operator()?;
            if !seen.insert(rule.id) {
                return Err(PromoError::DuplicateId(rule.id));
            }
        }
        for action in &self.actions {
            action.check_cells()?;
            if !seen.insert(action.id) {
                return Err(PromoError::DuplicateId(action.id));
            }
        }
        Ok(())
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn promo_type(&self) -> PromoType {
        self.promo_type
    }

    pub fn multiplier(&self) -> &str {
        &self.multiplier
    }

    pub fn fixed_amount(&self) -> &str {
        &self.fixed_amount
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn audience_type(&self) -> AudienceType {
        self.audience_type
    }

    pub fn uids_text(&self) -> &str {
        &self.uids_text
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: Uuid) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rule_logic(&self) -> MatchLogic {
        self.rule_logic
    }

    pub fn cost_mode(&self) -> CostMode {
        self.cost_mode
    }

    pub fn target_margin(&self) -> &str {
        &self.target_margin
    }

    pub fn caps(&self) -> &Caps {
        &self.caps
    }

    pub fn non_boosted_only(&self) -> bool {
        self.non_boosted_only
    }

    pub fn integrations(&self) -> &Integrations {
        &self.integrations
    }

    pub fn actions_logic(&self) -> MatchLogic {
        self.actions_logic
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, id: Uuid) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    // ─── Basics ─────────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_promo_type(&mut self, promo_type: PromoType) {
        self.promo_type = promo_type;
    }

    /// Whole numbers only; non-digits are dropped.
    pub fn set_multiplier(&mut self, raw: &str) {
        self.multiplier = sanitize_digits(raw);
    }

    pub fn set_fixed_amount(&mut self, raw: &str) {
        self.fixed_amount = sanitize_decimal(raw);
    }

    pub fn set_schedule_start(&mut self, raw: &str) -> PromoResult<()> {
        self.schedule.start = parse_timestamp(raw)?;
        Ok(())
    }

    pub fn set_schedule_end(&mut self, raw: &str) -> PromoResult<()> {
        self.schedule.end = parse_timestamp(raw)?;
        Ok(())
    }

    // ─── Audience ───────────────────────────────────────────────────────

    pub fn set_audience_type(&mut self, audience_type: AudienceType) {
        self.audience_type = audience_type;
    }

    pub fn set_uids_text(&mut self, text: &str) {
        self.uids_text = text.to_string();
    }

    pub fn set_rule_logic(&mut self, logic: MatchLogic) {
        self.rule_logic = logic;
    }

    /// Append the starter rule under a caller-assigned id.
    pub fn add_rule(&mut self, id: Uuid) -> PromoResult<()> {
        self.insert_rule(Rule::starter(id))
    }

    /// Append a fully specified rule.
    pub fn insert_rule(&mut self, rule: Rule) -> PromoResult<()> {
        rule.check_operator()?;
        self.ensure_fresh_id(rule.id)?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn remove_rule(&mut self, id: Uuid) -> PromoResult<()> {
        let idx = self.rule_index(id)?;
        self.rules.remove(idx);
        Ok(())
    }

    /// Point a rule at another field. The operator resets to the field's
    /// default and both values clear.
    pub fn set_rule_field(&mut self, id: Uuid, field: FieldKey) -> PromoResult<()> {
        let idx = self.rule_index(id)?;
        self.rules[idx].retarget(field);
        Ok(())
    }

    pub fn set_rule_op(&mut self, id: Uuid, op: Operator) -> PromoResult<()> {
        let idx = self.rule_index(id)?;
        ensure_operator(self.rules[idx].field, op)?;
        self.rules[idx].op = op;
        Ok(())
    }

    pub fn set_rule_value(&mut self, id: Uuid, value: &str) -> PromoResult<()> {
        let idx = self.rule_index(id)?;
        self.rules[idx].value = value.to_string();
        Ok(())
    }

    pub fn set_rule_value2(&mut self, id: Uuid, value: &str) -> PromoResult<()> {
        let idx = self.rule_index(id)?;
        self.rules[idx].value2 = value.to_string();
        Ok(())
    }

    // ─── Cost handling, caps, constraints ───────────────────────────────

    pub fn set_cost_mode(&mut self, mode: CostMode) {
        self.cost_mode = mode;
    }

    pub fn set_target_margin(&mut self, raw: &str) {
        self.target_margin = sanitize_decimal(raw);
    }

    pub fn set_caps_enabled(&mut self, enabled: bool) {
        self.caps.enabled = enabled;
    }

    pub fn set_per_user_cap(&mut self, raw: &str) {
        self.caps.per_user_points = sanitize_decimal(raw);
    }

    pub fn set_total_cap(&mut self, raw: &str) {
        self.caps.total_points = sanitize_decimal(raw);
    }

    pub fn set_non_boosted_only(&mut self, on: bool) {
        self.non_boosted_only = on;
    }

    // ─── Integrations ───────────────────────────────────────────────────

    pub fn set_eligibility_url(&mut self, url: &str) {
        self.integrations.eligibility_url = url.to_string();
    }

    pub fn set_webhook_url(&mut self, url: &str) {
        self.integrations.webhook_url = url.to_string();
    }

    // ─── Actions ────────────────────────────────────────────────────────

    pub fn set_actions_logic(&mut self, logic: MatchLogic) {
        self.actions_logic = logic;
    }

    /// Append a new action of the given type under a caller-assigned id.
    pub fn add_action(&mut self, id: Uuid, action_type: ActionType) -> PromoResult<()> {
        self.ensure_fresh_id(id)?;
        self.actions.push(Action::new(id, action_type));
        Ok(())
    }

    pub fn remove_action(&mut self, id: Uuid) -> PromoResult<()> {
        let idx = self.action_index(id)?;
        self.actions.remove(idx);
        Ok(())
    }

    pub fn update_action(&mut self, id: Uuid, edit: ActionAttribute) -> PromoResult<()> {
        let idx = self.action_index(id)?;
        self.actions[idx].update(edit)
    }

    // ─── Helpers ────────────────────────────────────────────────────────

    fn rule_index(&self, id: Uuid) -> PromoResult<usize> {
        self.rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(PromoError::RuleNotFound(id))
    }

    fn action_index(&self, id: Uuid) -> PromoResult<usize> {
        self.actions
            .iter()
            .position(|a| a.id == id)
            .ok_or(PromoError::ActionNotFound(id))
    }

    fn ensure_fresh_id(&self, id: Uuid) -> PromoResult<()> {
        let taken = self.rules.iter().any(|r| r.id == id)
            || self.actions.iter().any(|a| a.id == id);
        if taken {
            Err(PromoError::DuplicateId(id))
        } else {
            Ok(())
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(&IntegrationsConfig::default())
    }
}

// ─── Edits as values ────────────────────────────────────────────────────────

/// A single editing operation, serializable so edits can be scripted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DraftEdit {
    SetName { name: String },
    SetPromoType { promo_type: PromoType },
    SetMultiplier { value: String },
    SetFixedAmount { value: String },
    SetScheduleStart { value: String },
    SetScheduleEnd { value: String },
    SetAudienceType { audience_type: AudienceType },
    SetUidsText { text: String },
    SetRuleLogic { logic: MatchLogic },
    AddRule { id: Uuid },
    RemoveRule { id: Uuid },
    SetRuleField { id: Uuid, field: FieldKey },
    SetRuleOp { id: Uuid, rule_op: Operator },
    SetRuleValue { id: Uuid, value: String },
    SetRuleValue2 { id: Uuid, value: String },
    SetCostMode { mode: CostMode },
    SetTargetMargin { value: String },
    SetCapsEnabled { enabled: bool },
    SetPerUserCap { value: String },
    SetTotalCap { value: String },
    SetNonBoostedOnly { enabled: bool },
    SetEligibilityUrl { url: String },
    SetWebhookUrl { url: String },
    SetActionsLogic { logic: MatchLogic },
    AddAction { id: Uuid, action_type: ActionType },
    RemoveAction { id: Uuid },
    UpdateAction { id: Uuid, edit: ActionAttribute },
}

impl DraftEdit {
    /// Short name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DraftEdit::SetName { .. } => "set_name",
            DraftEdit::SetPromoType { .. } => "set_promo_type",
            DraftEdit::SetMultiplier { .. } => "set_multiplier",
            DraftEdit::SetFixedAmount { .. } => "set_fixed_amount",
            DraftEdit::SetScheduleStart { .. } => "set_schedule_start",
            DraftEdit::SetScheduleEnd { .. } => "set_schedule_end",
            DraftEdit::SetAudienceType { .. } => "set_audience_type",
            DraftEdit::SetUidsText { .. } => "set_uids_text",
            DraftEdit::SetRuleLogic { .. } => "set_rule_logic",
            DraftEdit::AddRule { .. } => "add_rule",
            DraftEdit::RemoveRule { .. } => "remove_rule",
            DraftEdit::SetRuleField { .. } => "set_rule_field",
            DraftEdit::SetRuleOp { .. } => "set_rule_op",
            DraftEdit::SetRuleValue { .. } => "set_rule_value",
            DraftEdit::SetRuleValue2 { .. } => "set_rule_value2",
            DraftEdit::SetCostMode { .. } => "set_cost_mode",
            DraftEdit::SetTargetMargin { .. } => "set_target_margin",
            DraftEdit::SetCapsEnabled { .. } => "set_caps_enabled",
            DraftEdit::SetPerUserCap { .. } => "set_per_user_cap",
            DraftEdit::SetTotalCap { .. } => "set_total_cap",
            DraftEdit::SetNonBoostedOnly { .. } => "set_non_boosted_only",
            DraftEdit::SetEligibilityUrl { .. } => "set_eligibility_url",
            DraftEdit::SetWebhookUrl { .. } => "set_webhook_url",
            DraftEdit::SetActionsLogic { .. } => "set_actions_logic",
            DraftEdit::AddAction { .. } => "add_action",
            DraftEdit::RemoveAction { .. } => "remove_action",
            DraftEdit::UpdateAction { .. } => "update_action",
        }
    }
}

impl Draft {
    /// Apply one edit. On error the draft is unchanged.
    pub fn apply(&mut self, edit: DraftEdit) -> PromoResult<()> {
        match edit {
            DraftEdit::SetName { name } => self.set_name(&name),
            DraftEdit::SetPromoType { promo_type } => self.set_promo_type(promo_type),
            DraftEdit::SetMultiplier { value } => self.set_multiplier(&value),
            DraftEdit::SetFixedAmount { value } => self.set_fixed_amount(&value),
            DraftEdit::SetScheduleStart { value } => self.set_schedule_start(&value)?,
            DraftEdit::SetScheduleEnd { value } => self.set_schedule_end(&value)?,
            DraftEdit::SetAudienceType { audience_type } => self.set_audience_type(audience_type),
            DraftEdit::SetUidsText { text } => self.set_uids_text(&text),
            DraftEdit::SetRuleLogic { logic } => self.set_rule_logic(logic),
            DraftEdit::AddRule { id } => self.add_rule(id)?,
            DraftEdit::RemoveRule { id } => self.remove_rule(id)?,
            DraftEdit::SetRuleField { id, field } => self.set_rule_field(id, field)?,
            DraftEdit::SetRuleOp { id, rule_op } => self.set_rule_op(id, rule_op)?,
            DraftEdit::SetRuleValue { id, value } => self.set_rule_value(id, &value)?,
            DraftEdit::SetRuleValue2 { id, value } => self.set_rule_value2(id, &value)?,
            DraftEdit::SetCostMode { mode } => self.set_cost_mode(mode),
            DraftEdit::SetTargetMargin { value } => self.set_target_margin(&value),
            DraftEdit::SetCapsEnabled { enabled } => self.set_caps_enabled(enabled),
            DraftEdit::SetPerUserCap { value } => self.set_per_user_cap(&value),
            DraftEdit::SetTotalCap { value } => self.set_total_cap(&value),
            DraftEdit::SetNonBoostedOnly { enabled } => self.set_non_boosted_only(enabled),
            DraftEdit::SetEligibilityUrl { url } => self.set_eligibility_url(&url),
            DraftEdit::SetWebhookUrl { url } => self.set_webhook_url(&url),
            DraftEdit::SetActionsLogic { logic } => self.set_actions_logic(logic),
            DraftEdit::AddAction { id, action_type } => self.add_action(id, action_type)?,
            DraftEdit::RemoveAction { id } => self.remove_action(id)?,
            DraftEdit::UpdateAction { id, edit } => self.update_action(id, edit)?,
        }
        Ok(())
    }
}
