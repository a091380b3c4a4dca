pub mod governor_handlers;
pub mod ingest_handlers;
pub mod ops_handlers;
pub mod report_handlers;

pub use governor_handlers::*;
pub use ingest_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
