//! Client-side view state
//!
//! Column filters, free-text query, sort and pagination compose in a fixed
//! order (filter, query, sort, paginate) over a fully loaded record list.
//! Selection is keyed by record identifier and survives paging and filtering.

mod filter;
mod page;
mod project;
mod selection;
mod sort;
mod state;

pub use filter::*;
pub use page::*;
pub use project::*;
pub use selection::*;
pub use sort::*;
pub use state::*;
