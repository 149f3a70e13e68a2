//! Stavax Account - connect dApps to the Stavax wallet host
//!
//! This crate orchestrates how a dApp reaches the wallet host that lives
//! inside a messaging app's bot web app:
//!
//! - **Connection**: turn a WalletConnect pairing URI into a registered
//!   session and hand it to the host ([`StavaxAccount::connect`],
//!   [`StavaxAccount::wagmi_connect`])
//! - **Hand-off**: pick the transport for the current environment (deep link,
//!   embedded drawer, or nothing) with [`select_route`]
//! - **Transactions**: try a pre-authorized smart session first, fall back to
//!   the chain client ([`StavaxAccount::send_transaction`])
//! - **Injected provider**: relay EIP-1193 requests to the host frame when the
//!   dApp runs inside the host's in-app browser ([`InjectedProvider`])
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stavax::{StavaxAccount, StavaxConfig, resolve_config};
//!
//! let config = resolve_config(&StavaxConfig::new("my-project-id"))?;
//! let account = StavaxAccount::builder(config)
//!     .connector(wallet_connect)
//!     .chain(chain_client)
//!     .build()?;
//!
//! let session = account.connect(None).await?;
//! println!("session {}", session.id);
//! ```

mod account;
pub mod chain;
pub mod config;
pub mod connector;
pub mod drawer;
pub mod environment;
pub mod handoff;
pub mod injected;

#[cfg(test)]
mod test_support;

pub use account::{ConnectState, PairingAttempt, StavaxAccount, StavaxAccountBuilder};
pub use chain::{ChainClient, ContractCall, TransactionRequest, WriteContractRequest};
pub use config::{Config, DappMetadata, StavaxConfig, resolve_config};
pub use connector::{
	ConnectionResult, Connector, ConnectorMessage, INJECTED_CONNECTOR_ID, PairingListener, WALLET_CONNECT_CONNECTOR_ID,
};
pub use drawer::{DrawerWidget, EmbeddedDrawer};
pub use environment::{EnvironmentProbe, LaunchParams, StaticEnvironment};
pub use handoff::{DelayedHandoff, HandoffRoute, RouteInput, bot_web_app_url, embedded_web_url, select_route};
pub use injected::{InjectedConnector, InjectedProvider};
pub use stavax_protocol::{Session, SessionData, SmartSession};
pub use stavax_runtime::{Error, FileStorage, MemoryStorage, MessagePort, Result, Storage, WalletApi};
