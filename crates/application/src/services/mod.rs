pub mod retention_evaluator;

pub use retention_evaluator::{Evaluation, RetentionEvaluator};
