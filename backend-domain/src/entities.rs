// Domain entities
pub mod aggregate;
pub mod config;
pub mod event;
pub mod loadout;
pub mod page;
pub mod query;
pub mod record;

pub use aggregate::*;
pub use config::*;
pub use event::*;
pub use loadout::*;
pub use page::*;
pub use query::*;
pub use record::*;
