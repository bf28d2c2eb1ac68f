// Enrichment pipeline building blocks: row normalization and request throttling

pub mod processing;
pub mod throttle;
