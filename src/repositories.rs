pub mod provider;
pub mod token_cache;
