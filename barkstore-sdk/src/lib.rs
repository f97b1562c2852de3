//! Shared objects for the barkstore storefront.
//!
//! The `objects` module holds the serde types exchanged between the
//! storefront server and its clients. Enable the `client` feature for a
//! typed HTTP client over the same types.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
