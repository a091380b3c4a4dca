// Domain services: pure battle-report normalization and aggregation
pub mod aggregator;
pub mod calendar;
pub mod canonicalizer;
pub mod date_range;
pub mod extractor;
pub mod fields;
pub mod ingest;
pub mod loadout_parser;
pub mod paginator;
pub mod percentiles;
pub mod timestamp;
pub mod trade;

pub use aggregator::*;
pub use calendar::*;
pub use canonicalizer::*;
pub use date_range::*;
pub use extractor::*;
pub use fields::*;
pub use ingest::*;
pub use loadout_parser::*;
pub use paginator::*;
pub use percentiles::*;
pub use timestamp::*;
pub use trade::*;
