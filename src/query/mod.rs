//! Query-text construction and pagination against the indexer.
//!
//! - [`template`] - literal-substitution points shared by every query shape
//! - [`paginate`] - sequential skip/slice pagination over capped result sets

mod paginate;
mod template;

pub use paginate::{fetch_paged, fetch_sliced, PAGE_SIZE};
pub use template::{address_list, block_clause};
