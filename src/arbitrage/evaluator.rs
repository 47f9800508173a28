use tracing::info;

use crate::{
    arbitrage::{parser::parse_rows, OpportunityDetector},
    types::BatchEvaluation,
};

/// Runs the row parser and the detector over one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchEvaluator {
    detector: OpportunityDetector,
}

impl BatchEvaluator {
    pub fn new(detector: OpportunityDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &OpportunityDetector {
        &self.detector
    }

    pub fn evaluate<R, S>(&self, rows: &[R]) -> BatchEvaluation
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let parsed = parse_rows(rows);
        let opportunities = self.detector.detect(&parsed.quotes);

        info!(
            "Evaluated {} rows: {} quotes, {} rejected, {} opportunities",
            rows.len(),
            parsed.quotes.len(),
            parsed.rejections.len(),
            opportunities.len()
        );

        BatchEvaluation {
            has_opportunities: !opportunities.is_empty(),
            opportunities,
            rejections: parsed.rejections,
        }
    }
}

/// Evaluates a batch with default settings: exact price comparison, no threshold.
pub fn evaluate_batch<R, S>(rows: &[R]) -> BatchEvaluation
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    BatchEvaluator::default().evaluate(rows)
}
