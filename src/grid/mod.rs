//! Grid search over lump sums, extra-payment policies and active periods

mod dimensions;
mod metrics;
mod search;

pub use dimensions::{GridCombination, GridDimensions, PolicyAxis};
pub use metrics::{GridMetrics, RankCriterion};
pub use search::{GridEntry, GridResult, GridSearch, GridSearchResults};
