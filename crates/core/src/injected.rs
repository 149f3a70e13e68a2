//! EIP-1193 provider for dApps running inside the wallet host's in-app
//! browser.
//!
//! Signing and account requests are relayed to the host frame over a
//! [`ProviderChannel`]. Account and chain queries are answered locally from a
//! persisted record so they need no round trip.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{Value, json};
use stavax_protocol::{PageMetadata, RpcRequest};
use stavax_runtime::{DeviceIdentity, Error, MessagePort, ProviderChannel, Result, Storage};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::connector::{ConnectionResult, Connector, ConnectorMessage, INJECTED_CONNECTOR_ID};
use crate::environment::{LaunchParams, WEB_PLATFORM};

/// Storage key of the connected address.
pub const INJECTED_ADDRESS_KEY: &str = "stavax_injected_address";

/// Storage key of the selected chain id.
pub const INJECTED_CHAIN_ID_KEY: &str = "stavax_injected_chain_id";

/// Methods relayed to the wallet host.
const RELAYED_METHODS: &[&str] = &[
	"eth_requestAccounts",
	"personal_sign",
	"eth_sign",
	"eth_signTypedData",
	"eth_signTypedData_v4",
	"eth_sendTransaction",
];

/// Injected EIP-1193 provider.
pub struct InjectedProvider {
	channel: Arc<ProviderChannel>,
	storage: Arc<dyn Storage>,
	default_chain_id: u64,
}

impl InjectedProvider {
	pub fn new(channel: Arc<ProviderChannel>, storage: Arc<dyn Storage>, default_chain_id: u64) -> Self {
		Self {
			channel,
			storage,
			default_chain_id,
		}
	}

	/// Builds the provider and its channel from `config`.
	///
	/// Requests carry the dApp metadata, project id, device id, and the host
	/// platform from `launch` (`web` when unknown).
	pub fn from_config(
		config: &Config,
		port: Arc<dyn MessagePort>,
		storage: Arc<dyn Storage>,
		launch: Option<&LaunchParams>,
		default_chain_id: u64,
	) -> Result<Self> {
		let device_id = DeviceIdentity::new(Arc::clone(&storage)).get()?;
		let dapp = config.metadata();
		let metadata = PageMetadata {
			title: dapp.name.clone(),
			url: dapp.url.clone(),
			icon: dapp.icon.clone(),
			project_id: config.project_id().to_string(),
			device_id,
		};
		let platform = launch.map(LaunchParams::platform_tag).unwrap_or(WEB_PLATFORM);
		let channel = ProviderChannel::new(port, platform, metadata);
		Ok(Self::new(Arc::new(channel), storage, default_chain_id))
	}

	/// Channel relaying requests; feed inbound frame messages to it.
	pub fn channel(&self) -> &Arc<ProviderChannel> {
		&self.channel
	}

	/// Handles an EIP-1193 request.
	///
	/// # Errors
	///
	/// - [`Error::UnsupportedMethod`] for methods neither relayed nor handled
	///   locally
	/// - [`Error::Remote`] when the host rejects a relayed request
	pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
		match method {
			"eth_requestAccounts" => {
				let accounts = self.relay(method, params).await?;
				self.remember_accounts(&accounts)?;
				Ok(accounts)
			}
			m if RELAYED_METHODS.contains(&m) => self.relay(method, params).await,
			"eth_accounts" => Ok(match self.address()? {
				Some(address) => json!([address]),
				None => json!([]),
			}),
			"eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id()?))),
			"wallet_switchEthereumChain" => {
				let chain_id = requested_chain_id(&params)?;
				self.storage.set(INJECTED_CHAIN_ID_KEY, &chain_id.to_string())?;
				tracing::debug!(chain_id, "switched injected chain");
				Ok(Value::Null)
			}
			"wallet_revokePermissions" => {
				self.storage.remove(INJECTED_ADDRESS_KEY)?;
				Ok(Value::Null)
			}
			other => Err(Error::UnsupportedMethod(other.to_string())),
		}
	}

	/// Connected address, if any.
	pub fn address(&self) -> Result<Option<Address>> {
		Ok(self
			.storage
			.get(INJECTED_ADDRESS_KEY)?
			.and_then(|raw| raw.parse().ok()))
	}

	/// Selected chain id, falling back to the default.
	pub fn chain_id(&self) -> Result<u64> {
		Ok(self
			.storage
			.get(INJECTED_CHAIN_ID_KEY)?
			.and_then(|raw| raw.parse().ok())
			.unwrap_or(self.default_chain_id))
	}

	async fn relay(&self, method: &str, params: Value) -> Result<Value> {
		self.channel.request(RpcRequest::new(method, params)).await
	}

	fn remember_accounts(&self, accounts: &Value) -> Result<()> {
		let first = accounts
			.as_array()
			.and_then(|list| list.first())
			.and_then(Value::as_str)
			.ok_or_else(|| Error::ProtocolError(format!("eth_requestAccounts returned {}", accounts)))?;
		let address: Address = first
			.parse()
			.map_err(|e| Error::ProtocolError(format!("invalid account {:?}: {}", first, e)))?;
		self.storage.set(INJECTED_ADDRESS_KEY, &address.to_string())
	}
}

/// Chain id from `wallet_switchEthereumChain` params (`[{"chainId": "0x.."}]`).
fn requested_chain_id(params: &Value) -> Result<u64> {
	let raw = params
		.get(0)
		.and_then(|p| p.get("chainId"))
		.and_then(Value::as_str)
		.ok_or_else(|| Error::ProtocolError("wallet_switchEthereumChain expects [{\"chainId\": \"0x..\"}]".into()))?;
	let digits = raw.strip_prefix("0x").unwrap_or(raw);
	u64::from_str_radix(digits, 16).map_err(|e| Error::ProtocolError(format!("invalid chainId {:?}: {}", raw, e)))
}

/// [`Connector`] over an [`InjectedProvider`], registered under
/// [`INJECTED_CONNECTOR_ID`].
pub struct InjectedConnector {
	provider: Arc<InjectedProvider>,
	events: broadcast::Sender<ConnectorMessage>,
}

impl InjectedConnector {
	pub fn new(provider: Arc<InjectedProvider>) -> Self {
		let (events, _) = broadcast::channel(4);
		Self { provider, events }
	}

	pub fn provider(&self) -> &Arc<InjectedProvider> {
		&self.provider
	}
}

#[async_trait]
impl Connector for InjectedConnector {
	fn id(&self) -> &str {
		INJECTED_CONNECTOR_ID
	}

	fn subscribe(&self) -> broadcast::Receiver<ConnectorMessage> {
		self.events.subscribe()
	}

	async fn connect(&self) -> Result<ConnectionResult> {
		self.provider.request("eth_requestAccounts", json!([])).await?;
		let accounts = self.provider.address()?.into_iter().collect();
		let chain_id = self.provider.chain_id()?;
		let _ = self.events.send(ConnectorMessage::new("connect", Some(json!({ "chainId": chain_id }))));
		Ok(ConnectionResult { accounts, chain_id })
	}
}
