//! In-memory, address-keyed analytics cache.
//!
//! Owned explicitly by the [`Engine`](crate::Engine) and touched only
//! through the operations here; there are no module-level singletons.
//!
//! - [`slot`] - per-(entity, data kind) fetch state machine
//! - [`store`] - entity stores with track / stale-detection / commit ops

mod slot;
mod store;

pub use slot::FetchSlot;
pub use store::{CacheEntry, DataKind, EntityStore, ProtocolStore};
