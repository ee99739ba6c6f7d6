//! Remote transport backends

#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use in_memory::InMemoryRemote;
