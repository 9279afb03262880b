// Scoring engine — layer scoring, context boosting, rule adjustment,
// weighted aggregation and memoization.

pub mod aggregate;
pub mod cache;
pub mod context;
pub mod layer;
pub mod rules;
pub mod similarity;
