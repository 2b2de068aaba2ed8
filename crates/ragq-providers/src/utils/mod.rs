//! Shared helpers used by more than one network-backed adapter.

mod http_response;

pub use http_response::check_and_parse;
