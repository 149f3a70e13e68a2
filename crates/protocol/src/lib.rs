//! Wire types for the Stavax Account wallet host.
//!
//! This crate contains the serde-serializable shapes exchanged with the wallet
//! host: HTTP request/response bodies of the account API, the injected-provider
//! postMessage envelopes, and the embedded drawer messages.
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **1:1 with the wire**: Field names match what the host sends and expects
//!
//! Higher-level orchestration is built on top of these types in `stavax`.

pub mod api;
pub mod hex;
pub mod messages;
pub mod session;

pub use api::*;
pub use messages::*;
pub use session::*;
