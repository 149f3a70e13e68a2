//! Stavax Runtime - wallet host plumbing
//!
//! This crate provides the low-level infrastructure the account orchestration
//! layer is built on:
//!
//! - **Account API**: HTTP client for the wallet host backend (sessions and
//!   pre-authorized smart sessions)
//! - **Device identity**: a lazily generated, persisted per-browser token that
//!   tags every API request
//! - **Storage**: the key/value persistence seam behind the device identity
//!   and the injected provider's account record
//! - **Provider channel**: postMessage request/response correlation with the
//!   wallet host's parent frame
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     stavax      │  Orchestration (connect, hand-off, dispatch)
//! └────────┬────────┘
//!          │ WalletApi / MessagePort
//! ┌────────▼────────┐
//! │  stavax-runtime │  This crate
//! │  ┌───────────┐  │
//! │  │ ApiClient │  │  reqwest, project + device headers
//! │  └───────────┘  │
//! │  ┌───────────┐  │
//! │  │ Channel   │  │  id-correlated postMessage relay
//! │  └───────────┘  │
//! │  ┌───────────┐  │
//! │  │ Device    │  │  persisted 64-char token
//! │  └───────────┘  │
//! └─────────────────┘
//! ```

pub mod api;
pub mod channel;
pub mod device;
pub mod error;
pub mod storage;

pub use api::{ApiClient, WalletApi};
pub use channel::{MessagePort, ProviderChannel};
pub use device::{DEVICE_ID_KEY, DEVICE_ID_LEN, DeviceIdentity};
pub use error::{Error, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
