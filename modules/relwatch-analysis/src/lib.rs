pub mod analyzer;
pub mod insights;
pub mod roster;
pub mod scoring;
pub mod store;
pub mod summary;

pub use analyzer::{build_analysis, query_plan, select_analyses, Analyzer};
pub use roster::{RosterProvider, StaticRoster};
pub use scoring::compute_metrics;
pub use store::{AnalysisDocument, JsonAnalysisStore};
