pub mod category;
pub mod event;
pub mod filter;
pub mod store;
pub mod timezone;

pub use category::CategoryFilter;
pub use event::EventRecord;
pub use filter::EventQuery;
pub use store::{EventSource, Store};
