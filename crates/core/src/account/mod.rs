//! [`StavaxAccount`]: the entry point tying configuration, the account API,
//! connectors, the chain client, and the environment together.
//!
//! Operations are split by concern:
//!
//! - `connect`: pairing and session registration ([`StavaxAccount::connect`],
//!   [`StavaxAccount::wagmi_connect`])
//! - `bot`: session hand-off and the bot helpers ([`StavaxAccount::open_session`])
//! - `dispatch`: transactions ([`StavaxAccount::send_transaction`])

mod bot;
mod connect;
mod dispatch;

use std::sync::Arc;

pub use connect::{ConnectState, PairingAttempt};
use stavax_runtime::{ApiClient, DeviceIdentity, Error, MemoryStorage, Result, Storage, WalletApi};

use crate::chain::ChainClient;
use crate::config::Config;
use crate::connector::Connector;
use crate::drawer::EmbeddedDrawer;
use crate::environment::{EnvironmentProbe, StaticEnvironment};

/// Wallet-host bridge for one dApp page.
///
/// Cheap to clone; clones share all collaborators.
#[derive(Clone)]
pub struct StavaxAccount {
	inner: Arc<AccountInner>,
}

struct AccountInner {
	config: Config,
	api: Arc<dyn WalletApi>,
	device: Arc<DeviceIdentity>,
	environment: Arc<dyn EnvironmentProbe>,
	connectors: Vec<Arc<dyn Connector>>,
	chain: Option<Arc<dyn ChainClient>>,
	drawer: Option<Arc<EmbeddedDrawer>>,
}

impl StavaxAccount {
	pub fn builder(config: Config) -> StavaxAccountBuilder {
		StavaxAccountBuilder {
			config,
			storage: None,
			api: None,
			environment: None,
			connectors: Vec::new(),
			chain: None,
			drawer: None,
		}
	}

	pub fn config(&self) -> &Config {
		&self.inner.config
	}

	/// Persisted device id tagging account API requests.
	pub fn device_id(&self) -> Result<String> {
		self.inner.device.get()
	}

	pub fn environment(&self) -> &Arc<dyn EnvironmentProbe> {
		&self.inner.environment
	}

	/// Drawer registered for embedded mode.
	pub fn drawer(&self) -> Option<&Arc<EmbeddedDrawer>> {
		self.inner.drawer.as_ref()
	}

	/// Registered connector with the given id.
	pub fn connector(&self, id: &str) -> Option<Arc<dyn Connector>> {
		self.inner.connectors.iter().find(|c| c.id() == id).cloned()
	}

	fn chain(&self) -> Result<&Arc<dyn ChainClient>> {
		self.inner.chain.as_ref().ok_or_else(|| {
			Error::Configuration("No chain client registered; call StavaxAccountBuilder::chain before sending transactions".into())
		})
	}
}

impl std::fmt::Debug for StavaxAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StavaxAccount")
			.field("project_id", &self.inner.config.project_id())
			.field("connectors", &self.inner.connectors.iter().map(|c| c.id().to_string()).collect::<Vec<_>>())
			.field("chain", &self.inner.chain.is_some())
			.field("drawer", &self.inner.drawer)
			.finish()
	}
}

/// Builder for [`StavaxAccount`].
pub struct StavaxAccountBuilder {
	config: Config,
	storage: Option<Arc<dyn Storage>>,
	api: Option<Arc<dyn WalletApi>>,
	environment: Option<Arc<dyn EnvironmentProbe>>,
	connectors: Vec<Arc<dyn Connector>>,
	chain: Option<Arc<dyn ChainClient>>,
	drawer: Option<Arc<EmbeddedDrawer>>,
}

impl StavaxAccountBuilder {
	/// Storage for the device id. Defaults to [`MemoryStorage`].
	pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Account API implementation. Defaults to an [`ApiClient`] built from the config.
	pub fn api(mut self, api: Arc<dyn WalletApi>) -> Self {
		self.api = Some(api);
		self
	}

	/// Host environment. Defaults to a plain browser outside any host container.
	pub fn environment(mut self, environment: Arc<dyn EnvironmentProbe>) -> Self {
		self.environment = Some(environment);
		self
	}

	pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
		self.connectors.push(connector);
		self
	}

	pub fn chain(mut self, chain: Arc<dyn ChainClient>) -> Self {
		self.chain = Some(chain);
		self
	}

	/// Drawer used for embedded-mode hand-off.
	pub fn drawer(mut self, drawer: Arc<EmbeddedDrawer>) -> Self {
		self.drawer = Some(drawer);
		self
	}

	pub fn build(self) -> Result<StavaxAccount> {
		let storage = self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::new()));
		let device = Arc::new(DeviceIdentity::new(storage));

		let api = match self.api {
			Some(api) => api,
			None => Arc::new(ApiClient::new(
				self.config.api_url(),
				self.config.project_id(),
				self.config.request_timeout(),
				Arc::clone(&device),
			)?),
		};

		if self.config.using_embedded_mode() && self.drawer.is_none() {
			tracing::warn!("embedded mode enabled without a drawer; embedded hand-off will be skipped");
		}

		Ok(StavaxAccount {
			inner: Arc::new(AccountInner {
				config: self.config,
				api,
				device,
				environment: self.environment.unwrap_or_else(|| Arc::new(StaticEnvironment::browser())),
				connectors: self.connectors,
				chain: self.chain,
				drawer: self.drawer,
			}),
		})
	}
}
