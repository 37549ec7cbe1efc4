//! CLI command implementations.

pub mod search;
pub mod sources;

pub use search::SearchCommand;
pub use sources::list_sources;
