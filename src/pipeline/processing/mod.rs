// Pipeline processing: turning raw export rows into collection items

pub mod record_normalizer;

pub use record_normalizer::{ExportNormalizer, Normalizer};
