// Domain value objects
pub mod granularity;
pub mod identifiers;
pub mod time_window;

pub use granularity::*;
pub use identifiers::*;
pub use time_window::*;
