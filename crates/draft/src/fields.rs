//! Static catalog of audience fields and the operators legal for each.

use promo_core::{PromoError, PromoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Field Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    String,
    Boolean,
}

impl FieldType {
    /// Operators a rule on a field of this type may use. The first entry is
    /// the default applied when a rule switches to this type.
    pub fn operators(&self) -> &'static [Operator] {
        match self {
            FieldType::Number => &[
                Operator::Gt,
                Operator::Gte,
                Operator::Eq,
                Operator::Lte,
                Operator::Lt,
                Operator::Between,
            ],
            FieldType::String | FieldType::Boolean => &[Operator::Eq, Operator::Ne],
        }
    }

    pub fn default_operator(&self) -> Operator {
        self.operators()[0]
    }

    pub fn allows(&self, op: Operator) -> bool {
        self.operators().contains(&op)
    }
}

// ─── Operators ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "between")]
    Between,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lte => "<=",
            Operator::Lt => "<",
            Operator::Between => "between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = PromoError;

    fn from_str(s: &str) -> PromoResult<Self> {
        match s {
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<=" => Ok(Operator::Lte),
            "<" => Ok(Operator::Lt),
            "between" => Ok(Operator::Between),
            other => Err(PromoError::UnknownOperator(other.to_string())),
        }
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    DaysSinceLastInstall,
    LifetimeInstalls,
    LifetimeRewards,
    LifetimeRewardEvents,
    IsSpender,
    LifetimeSpend,
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: FieldKey,
    pub label: &'static str,
    pub field_type: FieldType,
}

pub const FIELDS: [FieldDef; 7] = [
    FieldDef {
        key: FieldKey::DaysSinceLastInstall,
        label: "Days Since Last Install",
        field_type: FieldType::Number,
    },
    FieldDef {
        key: FieldKey::LifetimeInstalls,
        label: "Lifetime Installs",
        field_type: FieldType::Number,
    },
    FieldDef {
        key: FieldKey::LifetimeRewards,
        label: "Lifetime Rewards",
        field_type: FieldType::Number,
    },
    FieldDef {
        key: FieldKey::LifetimeRewardEvents,
        label: "Lifetime Reward Events",
        field_type: FieldType::Number,
    },
    FieldDef {
        key: FieldKey::IsSpender,
        label: "Is spender",
        field_type: FieldType::Boolean,
    },
    FieldDef {
        key: FieldKey::LifetimeSpend,
        label: "Total Spend",
        field_type: FieldType::Number,
    },
    FieldDef {
        key: FieldKey::Country,
        label: "Country",
        field_type: FieldType::String,
    },
];

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::DaysSinceLastInstall => "days_since_last_install",
            FieldKey::LifetimeInstalls => "lifetime_installs",
            FieldKey::LifetimeRewards => "lifetime_rewards",
            FieldKey::LifetimeRewardEvents => "lifetime_reward_events",
            FieldKey::IsSpender => "is_spender",
            FieldKey::LifetimeSpend => "lifetime_spend",
            FieldKey::Country => "country",
        }
    }

    pub fn def(&self) -> &'static FieldDef {
        // FIELDS is declared in variant order.
        &FIELDS[*self as usize]
    }

    pub fn field_type(&self) -> FieldType {
        self.def().field_type
    }

    pub fn label(&self) -> &'static str {
        self.def().label
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = PromoError;

    fn from_str(s: &str) -> PromoResult<Self> {
        FIELDS
            .iter()
            .map(|f| f.key)
            .find(|k| k.as_str() == s)
            .ok_or_else(|| PromoError::UnknownField(s.to_string()))
    }
}
