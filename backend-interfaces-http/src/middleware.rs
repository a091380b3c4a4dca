pub mod ingest_body;

pub use ingest_body::*;
