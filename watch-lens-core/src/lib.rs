pub mod batch;
pub mod dashboard;
pub mod error;
pub mod record;
pub mod titles;

pub use batch::{Batch, BatchPlan, DEFAULT_BATCH_SIZE, partition};
pub use dashboard::{
    CategoryShare, CategoryTransition, DashboardData, EVIDENCE_STRENGTH_MAX, FormatDistribution,
    KeyInsights, PsychologicalPattern, Recommendation, TRANSITION_STRENGTH_MAX,
};
pub use error::CoreError;
pub use record::{CategoryTaxonomy, WatchRecord};
pub use titles::{TitleStats, WATCHED_PREFIX, normalize_title};
