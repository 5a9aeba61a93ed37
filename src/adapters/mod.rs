// Adapters layer: concrete implementations for external systems (file system, http).

pub mod http;
pub mod storage;

pub use http::JsonPointerSource;
pub use storage::LocalStorage;
