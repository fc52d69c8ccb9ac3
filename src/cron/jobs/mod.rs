pub mod refresh_pools;
pub mod refresh_protocol;
pub mod refresh_tokens;
