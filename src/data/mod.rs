//! Query construction, response parsing and metric derivation per entity
//! kind.
//!
//! Each submodule owns the full path from query text to derived output
//! types: the raw subgraph row structs live next to the queries that
//! produce them, and the derivation functions are pure so the delta math is
//! testable without a network.

pub mod chart;
pub mod pools;
pub mod prices;
pub mod protocol;
pub mod tokens;
pub mod transactions;
