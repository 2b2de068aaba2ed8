//! Caching decorators over repository ports.

mod api_key_cache;

pub use api_key_cache::CachingApiKeyRepository;
