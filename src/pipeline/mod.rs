// Batch pipeline — classify the stored corpus and write labels back.

pub mod batch;
