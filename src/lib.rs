// Industry tagger: keyword-taxonomy industry labelling for news articles
//
// This is the library root. Each module corresponds to a stage of the
// labelling pipeline: taxonomy loading, scoring, classification, storage,
// and batch processing.

pub mod classifier;
pub mod config;
pub mod db;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod status;
pub mod taxonomy;
