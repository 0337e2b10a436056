//! Eligibility checks for a single user identifier against a draft.
//!
//! - `MockEligibilityChecker`: randomized placeholder outcome
//! - `HttpEligibilityChecker`: POSTs to the draft's declared eligibility API

use async_trait::async_trait;
use promo_core::config::{EligibilityConfig, EligibilityMode};
use promo_core::{PromoError, PromoResult};
use promo_draft::Payload;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ELIGIBLE_REASON: &str = "Eligible based on rules";
pub const FILTERED_REASON: &str = "Filtered by rules";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub uid: String,
    pub eligible: bool,
    pub reason: String,
}

impl EligibilityOutcome {
    fn new(uid: &str, eligible: bool, reason: Option<String>) -> Self {
        let reason = reason.unwrap_or_else(|| {
            if eligible {
                ELIGIBLE_REASON.to_string()
            } else {
                FILTERED_REASON.to_string()
            }
        });
        Self {
            uid: uid.to_string(),
            eligible,
            reason,
        }
    }
}

impl fmt::Display for EligibilityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.eligible {
            "Eligible"
        } else {
            "Not eligible"
        };
        write!(f, "{}: {} - {}", self.uid, verdict, self.reason)
    }
}

#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    async fn check(&self, uid: &str, campaign: &Payload) -> PromoResult<EligibilityOutcome>;
}

// ─── Mock ───────────────────────────────────────────────────────────────────

/// Placeholder checker: accepts roughly `accept_rate` of the time, ignoring
/// the campaign entirely.
#[derive(Debug, Clone)]
pub struct MockEligibilityChecker {
    reject_threshold: f64,
}

impl MockEligibilityChecker {
    pub fn new(accept_rate: f64) -> Self {
        let rate = accept_rate.clamp(0.0, 1.0);
        // Rounded so 0.7 yields a cut-off of exactly 0.3, not 0.30000000000000004.
        let reject_threshold = ((1.0 - rate) * 1e9).round() / 1e9;
        Self { reject_threshold }
    }

    /// Outcome for a uniform roll in [0, 1). Eligible when the roll is
    /// strictly above the reject threshold.
    pub fn decide(&self, uid: &str, roll: f64) -> EligibilityOutcome {
        EligibilityOutcome::new(uid, roll > self.reject_threshold, None)
    }
}

impl Default for MockEligibilityChecker {
    fn default() -> Self {
        Self::new(0.7)
    }
}

#[async_trait]
impl EligibilityChecker for MockEligibilityChecker {
    async fn check(&self, uid: &str, _campaign: &Payload) -> PromoResult<EligibilityOutcome> {
        let roll: f64 = rand::thread_rng().gen();
        let outcome = self.decide(uid, roll);
        metrics::counter!("promo.eligibility.checks", "mode" => "mock").increment(1);
        debug!(uid, roll, eligible = outcome.eligible, "Mock eligibility check");
        Ok(outcome)
    }
}

// ─── HTTP ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EligibilityRequest<'a> {
    uid: &'a str,
    campaign: &'a Payload,
}

#[derive(Debug, Deserialize)]
struct EligibilityResponse {
    eligible: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Count and log a failed call before handing back the error.
fn failure(uid: &str, url: &str, reason: String) -> PromoError {
    metrics::counter!("promo.eligibility.failures").increment(1);
    warn!(uid, url = %url, error = %reason, "Eligibility check failed");
    PromoError::Eligibility(reason)
}

/// Calls the eligibility endpoint declared in the campaign's integrations.
pub struct HttpEligibilityChecker {
    http: reqwest::Client,
}

impl HttpEligibilityChecker {
    pub fn new(timeout: Duration) -> PromoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PromoError::Eligibility(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl EligibilityChecker for HttpEligibilityChecker {
    async fn check(&self, uid: &str, campaign: &Payload) -> PromoResult<EligibilityOutcome> {
        let url = &campaign.integrations.eligibility_api.url;
        let response = self
            .http
            .post(url)
            .json(&EligibilityRequest { uid, campaign })
            .send()
            .await
            .map_err(|e| failure(uid, url, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(failure(
                uid,
                url,
                format!("eligibility API returned {}: {}", status, body),
            ));
        }

        let body: EligibilityResponse = response
            .json()
            .await
            .map_err(|e| failure(uid, url, e.to_string()))?;

        metrics::counter!("promo.eligibility.checks", "mode" => "http").increment(1);
        info!(uid, url = %url, eligible = body.eligible, "Eligibility checked");
        Ok(EligibilityOutcome::new(uid, body.eligible, body.reason))
    }
}

/// Build the checker the configuration asks for.
pub fn checker_from_config(config: &EligibilityConfig) -> PromoResult<Box<dyn EligibilityChecker>> {
    match config.mode {
        EligibilityMode::Mock => Ok(Box::new(MockEligibilityChecker::new(
            config.mock_accept_rate,
        ))),
        EligibilityMode::Http => Ok(Box::new(HttpEligibilityChecker::new(
            Duration::from_millis(config.timeout_ms),
        )?)),
    }
}
