use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, Result},
};

/// Scores above this are reported in a rejection explanation.
const CATEGORY_REPORT_THRESHOLD: f64 = 0.5;
const NON_TOXIC_LABEL: &str = "non-toxic";

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_approved: bool,
    #[serde(default)]
    pub toxicity_score: f64,
    #[serde(default)]
    pub details: BTreeMap<String, f64>,
}

impl ModerationVerdict {
    pub fn approved() -> Self {
        Self {
            is_approved: true,
            toxicity_score: 0.0,
            details: BTreeMap::new(),
        }
    }

    /// Human readable reason shown to the author of a rejected comment.
    pub fn rejection_reason(&self) -> String {
        let mut flagged: Vec<(&String, f64)> = self
            .details
            .iter()
            .filter(|(label, score)| {
                **score > CATEGORY_REPORT_THRESHOLD && label.as_str() != NON_TOXIC_LABEL
            })
            .map(|(label, score)| (label, *score))
            .collect();
        flagged.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let categories = if flagged.is_empty() {
            "none".to_string()
        } else {
            flagged
                .iter()
                .map(|(label, score)| format!("{} ({:.0}%)", label, score * 100.0))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Your comment was rejected by moderation. Overall toxicity: {:.0}%. \
             Flagged categories: {}. Please rephrase your comment.",
            self.toxicity_score * 100.0,
            categories
        )
    }
}

/// Client for the external moderation oracle.
///
/// Without a configured base URL every text is approved. With one, any
/// transport, status or decode failure is `AppError::ModerationUnavailable`.
#[derive(Clone)]
pub struct ModerationGate {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ModerationGate {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build moderation client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.filter(|url| !url.trim().is_empty()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.moderation_service_url.clone(),
            config.moderation_timeout(),
        )
    }

    /// Gate that approves everything.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    pub async fn moderate(&self, text: &str) -> Result<ModerationVerdict> {
        let Some(base_url) = &self.base_url else {
            return Ok(ModerationVerdict::approved());
        };

        let url = format!("{}/moderate", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&ModerationRequest { text })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::ModerationUnavailable(e.to_string()))?;

        let verdict = response
            .json::<ModerationVerdict>()
            .await
            .map_err(|e| AppError::ModerationUnavailable(format!("invalid response: {e}")))?;

        tracing::debug!(
            approved = verdict.is_approved,
            toxicity = verdict.toxicity_score,
            "Moderation verdict received"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(score: f64, details: &[(&str, f64)]) -> ModerationVerdict {
        ModerationVerdict {
            is_approved: false,
            toxicity_score: score,
            details: details
                .iter()
                .map(|(label, score)| (label.to_string(), *score))
                .collect(),
        }
    }

    #[test]
    fn rejection_lists_toxic_categories_with_percentages() {
        let message = verdict(0.9, &[("insult", 0.8), ("non-toxic", 0.1)]).rejection_reason();

        assert!(message.contains("insult (80%)"), "{message}");
        assert!(message.contains("90%"), "{message}");
        assert!(!message.contains("non-toxic"), "{message}");
    }

    #[test]
    fn rejection_skips_low_scores_and_orders_by_score() {
        let message = verdict(
            0.95,
            &[
                ("dangerous", 0.2),
                ("obscenity", 0.6),
                ("threat", 0.93),
                ("non-toxic", 0.7),
            ],
        )
        .rejection_reason();

        assert!(message.contains("Flagged categories: threat (93%), obscenity (60%)."));
        assert!(!message.contains("dangerous"));
        assert!(!message.contains("non-toxic"));
    }

    #[test]
    fn rejection_without_flagged_categories_says_none() {
        let message = verdict(0.8, &[("insult", 0.5)]).rejection_reason();
        assert!(message.contains("Flagged categories: none."));
        assert!(message.contains("80%"));
    }

    #[tokio::test]
    async fn unconfigured_gate_approves_everything() {
        let gate = ModerationGate::new(None, Duration::from_secs(5)).unwrap();
        assert!(!gate.is_enabled());

        let verdict = gate.moderate("<script>alert(1)</script>").await.unwrap();
        assert!(verdict.is_approved);
    }

    #[test]
    fn blank_url_counts_as_unconfigured() {
        let gate = ModerationGate::new(Some("  ".to_string()), Duration::from_secs(5)).unwrap();
        assert!(!gate.is_enabled());
    }
}
