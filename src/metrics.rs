use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{BatchEvaluation, RejectionReason};

/// In-process counters for the checks served since startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetrics {
    pub uptime_seconds: u64,
    pub total_checks: u64,
    pub checks_with_opportunities: u64,
    pub total_opportunities_found: u64,
    pub total_rows_rejected: u64,
    pub rejections_by_reason: HashMap<RejectionReason, u64>,
    pub fetch_failures: u64,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            uptime_seconds: 0,
            total_checks: 0,
            checks_with_opportunities: 0,
            total_opportunities_found: 0,
            total_rows_rejected: 0,
            rejections_by_reason: HashMap::new(),
            fetch_failures: 0,
            last_error: None,
            started_at: now,
            last_updated: now,
        }
    }

    pub fn record_evaluation(&mut self, evaluation: &BatchEvaluation) {
        self.total_checks += 1;
        self.total_opportunities_found += evaluation.opportunities.len() as u64;
        self.total_rows_rejected += evaluation.rejections.len() as u64;

        if evaluation.has_opportunities {
            self.checks_with_opportunities += 1;
        }

        for rejection in &evaluation.rejections {
            *self.rejections_by_reason.entry(rejection.reason).or_insert(0) += 1;
        }

        self.last_updated = Utc::now();
    }

    pub fn record_fetch_failure(&mut self, error_message: &str) {
        self.total_checks += 1;
        self.fetch_failures += 1;
        self.last_error = Some(error_message.to_string());
        self.last_updated = Utc::now();
    }

    /// Copy with `uptime_seconds` brought up to date.
    pub fn snapshot(&self) -> Self {
        let mut snapshot = self.clone();
        snapshot.uptime_seconds = (Utc::now() - self.started_at).num_seconds().max(0) as u64;
        snapshot
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.snapshot();
        let mut report = String::new();

        report.push_str("=== Arbitrage Checker Metrics Report ===\n");
        report.push_str(&format!("Uptime: {} seconds\n", snapshot.uptime_seconds));
        report.push_str(&format!("Total Checks: {}\n", snapshot.total_checks));
        report.push_str(&format!(
            "Checks With Opportunities: {}\n",
            snapshot.checks_with_opportunities
        ));
        report.push_str(&format!(
            "Opportunities Found: {}\n",
            snapshot.total_opportunities_found
        ));
        report.push_str(&format!("Rows Rejected: {}\n", snapshot.total_rows_rejected));
        report.push_str(&format!("Fetch Failures: {}\n", snapshot.fetch_failures));

        if let Some(ref error) = snapshot.last_error {
            report.push_str(&format!("Last Error: {}\n", error));
        }

        if !snapshot.rejections_by_reason.is_empty() {
            report.push_str("\n=== Rejections ===\n");
            let mut reasons: Vec<_> = snapshot.rejections_by_reason.iter().collect();
            reasons.sort_by(|a, b| b.1.cmp(a.1));
            for (reason, count) in reasons {
                report.push_str(&format!("{:?}: {}\n", reason, count));
            }
        }

        report.push_str(&format!("\nLast Updated: {}\n", snapshot.last_updated));

        report
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
