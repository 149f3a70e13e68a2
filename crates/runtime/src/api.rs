//! HTTP client for the wallet host's account API.
//!
//! Every request is a JSON `POST` tagged with the project id and the device id
//! (see [`DeviceIdentity`]). The configured request timeout applies to the
//! whole exchange; a timeout is reported like any other network failure.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::TxHash;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use stavax_protocol::{
	ApiResponse, DEVICE_ID_HEADER, FIND_SMART_SESSION_PATH, NEW_SESSION_PATH, NewSessionRequest, PROJECT_ID_HEADER,
	SEND_SMART_TRANSACTION_PATH, Session, SessionData, SmartSession, SmartSessionQuery, SmartTransactionReceipt,
	SmartTransactionRequest,
};

use crate::device::DeviceIdentity;
use crate::error::{Error, Result};

/// Operations the orchestration layer needs from the wallet host backend.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute fakes.
#[async_trait]
pub trait WalletApi: Send + Sync {
	/// Registers a session carrying `data`.
	///
	/// # Errors
	///
	/// Any network, status, or decoding failure is reported as
	/// [`Error::SessionCreation`].
	async fn create_session(&self, data: SessionData) -> Result<Session>;

	/// Looks up a pre-authorized session matching `query`.
	///
	/// `Ok(None)` means the host has no matching spending rule.
	async fn find_smart_session(&self, query: &SmartSessionQuery) -> Result<Option<SmartSession>>;

	/// Executes a transaction against a pre-authorized session.
	///
	/// # Errors
	///
	/// Failures are reported as [`Error::SmartSession`].
	async fn send_smart_transaction(&self, request: &SmartTransactionRequest) -> Result<TxHash>;
}

/// reqwest-backed [`WalletApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
	http: reqwest::Client,
	base_url: String,
	project_id: String,
	timeout: Duration,
	device: Arc<DeviceIdentity>,
}

impl ApiClient {
	/// Creates a client for the API rooted at `base_url`.
	///
	/// # Errors
	///
	/// Returns [`Error::Configuration`] if the HTTP client cannot be built.
	pub fn new(
		base_url: impl Into<String>,
		project_id: impl Into<String>,
		timeout: Duration,
		device: Arc<DeviceIdentity>,
	) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			http,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			project_id: project_id.into(),
			timeout,
			device,
		})
	}

	/// Device identity used to tag requests.
	pub fn device(&self) -> &Arc<DeviceIdentity> {
		&self.device
	}

	async fn post<B, R>(&self, path: &str, body: &B) -> Result<Option<R>>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let device_id = self.device.get()?;
		let url = format!("{}{}", self.base_url, path);
		tracing::debug!(%url, "account API request");

		let response = self
			.http
			.post(&url)
			.header(PROJECT_ID_HEADER, &self.project_id)
			.header(DEVICE_ID_HEADER, device_id)
			.json(body)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					Error::Timeout(format!("{} did not answer within {}ms", path, self.timeout.as_millis()))
				} else {
					Error::Http(format!("{} request failed: {}", path, e))
				}
			})?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			return Err(Error::Http(format!("{} returned {}: {}", path, status, text.trim())));
		}

		let envelope: ApiResponse<R> = response
			.json()
			.await
			.map_err(|e| Error::ProtocolError(format!("Malformed response from {}: {}", path, e)))?;
		Ok(envelope.data)
	}
}

#[async_trait]
impl WalletApi for ApiClient {
	async fn create_session(&self, data: SessionData) -> Result<Session> {
		let body = NewSessionRequest {
			project_id: self.project_id.clone(),
			data,
		};

		match self.post::<_, Session>(NEW_SESSION_PATH, &body).await {
			Ok(Some(session)) => {
				tracing::debug!(session_id = %session.id, "wallet session created");
				Ok(session)
			}
			Ok(None) => Err(Error::SessionCreation("response carried no session".to_string())),
			Err(e) => {
				tracing::warn!(error = %e, "wallet session creation failed");
				Err(Error::SessionCreation(e.to_string()))
			}
		}
	}

	async fn find_smart_session(&self, query: &SmartSessionQuery) -> Result<Option<SmartSession>> {
		let found = self.post::<_, SmartSession>(FIND_SMART_SESSION_PATH, query).await?;
		tracing::debug!(found = found.is_some(), chain_id = query.chain_id, "smart session lookup");
		Ok(found)
	}

	async fn send_smart_transaction(&self, request: &SmartTransactionRequest) -> Result<TxHash> {
		match self
			.post::<_, SmartTransactionReceipt>(SEND_SMART_TRANSACTION_PATH, request)
			.await
		{
			Ok(Some(receipt)) => Ok(receipt.tx_hash),
			Ok(None) => Err(Error::SmartSession("response carried no transaction hash".to_string())),
			Err(e) => Err(Error::SmartSession(e.to_string())),
		}
	}
}
