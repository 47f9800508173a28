pub mod parser;
pub mod detector;
pub mod evaluator;

pub use parser::{parse_row, parse_rows};
pub use detector::OpportunityDetector;
pub use evaluator::{evaluate_batch, BatchEvaluator};
