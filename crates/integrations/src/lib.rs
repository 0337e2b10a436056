//! Outbound integrations declared by a campaign draft.

pub mod eligibility;

pub use eligibility::{
    checker_from_config, EligibilityChecker, EligibilityOutcome, HttpEligibilityChecker,
    MockEligibilityChecker,
};
