// Scoring engine: averages, season aggregation, sub-score calculators, and
// the batch driver.

pub mod averages;
pub mod batch;
pub mod compose;
pub mod draft_capital;
pub mod error;
pub mod imputation;
pub mod production;
pub mod season;
pub mod size;
pub mod stats;

pub use averages::{GlobalAverages, GradeAverages, RasBucketAverages, ScoringContext};
pub use batch::{compute_scores, run_batch, BatchReport};
pub use error::SkipReason;
