//! Connection orchestration for [`StavaxAccount`].
//!
//! A pairing attempt moves through [`ConnectState`]:
//!
//! ```text
//! Idle -> PairingStarted -> UriReceived -> SessionCreated -> HandedOff
//!                 \______________\_______________\__________> Failed
//! ```
//!
//! The connector's `connect` runs in a background task while the attempt
//! waits for its first `display_uri` message. The pairing URI is registered as
//! a session and handed off to the wallet host.

use stavax_protocol::{Session, SessionData};
use stavax_runtime::{Error, Result};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use super::StavaxAccount;
use crate::connector::{ConnectionResult, INJECTED_CONNECTOR_ID, PairingListener, WALLET_CONNECT_CONNECTOR_ID};

/// Progress of a pairing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
	Idle,
	PairingStarted,
	UriReceived,
	SessionCreated,
	HandedOff,
	Failed,
}

fn transition(state: &watch::Sender<ConnectState>, next: ConnectState) {
	let previous = state.send_replace(next);
	tracing::debug!(from = ?previous, to = ?next, "connect state");
}

/// A running pairing attempt started by [`StavaxAccount::start_pairing`].
///
/// The attempt produces at most one session. Dropping it leaves the
/// connector's connection running.
pub struct PairingAttempt {
	account: StavaxAccount,
	listener: PairingListener,
	completion: JoinHandle<Result<ConnectionResult>>,
	state: watch::Sender<ConnectState>,
}

impl PairingAttempt {
	pub fn state(&self) -> ConnectState {
		*self.state.borrow()
	}

	/// Receiver observing every state transition of this attempt.
	pub fn watch_state(&self) -> watch::Receiver<ConnectState> {
		self.state.subscribe()
	}

	/// Resolves with the session once it has been handed off.
	///
	/// The connector keeps connecting in the background.
	pub async fn session(self) -> Result<Session> {
		let PairingAttempt {
			account,
			listener,
			mut completion,
			state,
		} = self;

		let result = match first_event(listener, &mut completion).await {
			FirstEvent::Uri(Ok(uri)) => {
				transition(&state, ConnectState::UriReceived);
				account.pair_with_uri(&uri, &state).await
			}
			FirstEvent::Uri(Err(e)) => Err(e),
			FirstEvent::Finished(joined) => Err(ended_without_uri(joined)),
		};
		if result.is_err() {
			transition(&state, ConnectState::Failed);
		}
		result
	}

	/// Passes the session to `on_session` once handed off, then resolves with
	/// the connector's result.
	///
	/// Once a pairing URI arrived, the session is created and handed off even
	/// if the connector finishes meanwhile. A session failure aborts the
	/// connector's attempt. If the connector finishes before announcing a
	/// pairing URI, its result is returned and `on_session` is not called.
	pub async fn complete<F>(self, on_session: F) -> Result<ConnectionResult>
	where
		F: FnOnce(Session) + Send,
	{
		let PairingAttempt {
			account,
			listener,
			mut completion,
			state,
		} = self;

		let session = match first_event(listener, &mut completion).await {
			FirstEvent::Uri(Ok(uri)) => {
				transition(&state, ConnectState::UriReceived);
				account.pair_with_uri(&uri, &state).await
			}
			FirstEvent::Uri(Err(e)) => Err(e),
			FirstEvent::Finished(joined) => return settle(joined, &state),
		};

		match session {
			Ok(session) => on_session(session),
			Err(e) => {
				completion.abort();
				transition(&state, ConnectState::Failed);
				return Err(e);
			}
		}

		settle(completion.await, &state)
	}
}

type Joined = std::result::Result<Result<ConnectionResult>, JoinError>;

/// Whichever comes first: the pairing URI or the end of the connector task.
enum FirstEvent {
	Uri(Result<String>),
	Finished(Joined),
}

/// Races the listener only until it yields; a URI already announced wins
/// over a connector that finished right after it.
async fn first_event(listener: PairingListener, completion: &mut JoinHandle<Result<ConnectionResult>>) -> FirstEvent {
	tokio::select! {
		biased;
		uri = listener.next_display_uri() => FirstEvent::Uri(uri),
		joined = completion => FirstEvent::Finished(joined),
	}
}

impl std::fmt::Debug for PairingAttempt {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PairingAttempt").field("state", &self.state()).finish()
	}
}

fn settle(joined: Joined, state: &watch::Sender<ConnectState>) -> Result<ConnectionResult> {
	let result = joined.unwrap_or_else(|e| Err(Error::Connector(format!("connector task failed: {}", e))));
	if result.is_err() {
		transition(state, ConnectState::Failed);
	}
	result
}

fn ended_without_uri(joined: Joined) -> Error {
	match joined {
		Ok(Ok(_)) => Error::Connector("connector finished without announcing a pairing URI".into()),
		Ok(Err(e)) => e,
		Err(e) => Error::Connector(format!("connector task failed: {}", e)),
	}
}

impl StavaxAccount {
	/// Registers a session for a pairing URI and hands it off.
	///
	/// With `Some(uri)` the URI is used directly. With `None` a pairing attempt
	/// is started on the WalletConnect connector and its first pairing URI is
	/// used.
	///
	/// # Errors
	///
	/// - [`Error::SessionCreation`] if the session cannot be registered
	/// - [`Error::Handoff`] if the hand-off fails
	/// - [`Error::MissingUri`] if the connector announces an empty URI
	/// - [`Error::Configuration`] without a WalletConnect connector, or in
	///   injected mode
	pub async fn connect(&self, pairing_uri: Option<&str>) -> Result<Session> {
		match pairing_uri {
			Some(uri) => {
				let (state, _) = watch::channel(ConnectState::UriReceived);
				let result = self.pair_with_uri(uri, &state).await;
				if result.is_err() {
					transition(&state, ConnectState::Failed);
				}
				result
			}
			None => self.start_pairing()?.session().await,
		}
	}

	/// Starts a pairing attempt on the WalletConnect connector.
	///
	/// The connector is subscribed to before its connection starts, so the
	/// first pairing URI cannot be missed.
	pub fn start_pairing(&self) -> Result<PairingAttempt> {
		if self.config().using_injected_mode() {
			return Err(Error::Configuration(
				"Injected mode has no pairing URI; connect with wagmi_connect instead".into(),
			));
		}
		let connector = self.connector(WALLET_CONNECT_CONNECTOR_ID).ok_or_else(|| {
			Error::Configuration(format!(
				"No {:?} connector registered; add the WalletConnect connector before connecting",
				WALLET_CONNECT_CONNECTOR_ID
			))
		})?;

		let (state, _) = watch::channel(ConnectState::Idle);
		let listener = PairingListener::new(connector.as_ref());
		transition(&state, ConnectState::PairingStarted);
		let completion = tokio::spawn(async move { connector.connect().await });

		Ok(PairingAttempt {
			account: self.clone(),
			listener,
			completion,
			state,
		})
	}

	/// Connects through the wallet-connection library.
	///
	/// `on_session` receives the session created for the pairing URI; the
	/// call resolves with the connector's result. In injected mode the host's
	/// injected connector is connected directly: no session is created and
	/// `on_session` is not called.
	pub async fn wagmi_connect<F>(&self, on_session: F) -> Result<ConnectionResult>
	where
		F: FnOnce(Session) + Send,
	{
		if self.config().using_injected_mode() {
			let connector = self.connector(INJECTED_CONNECTOR_ID).ok_or_else(|| {
				Error::Configuration(format!(
					"Injected mode needs the {:?} connector; register the injected provider before connecting",
					INJECTED_CONNECTOR_ID
				))
			})?;
			tracing::debug!("connecting through injected provider");
			return connector.connect().await;
		}

		self.start_pairing()?.complete(on_session).await
	}

	async fn pair_with_uri(&self, uri: &str, state: &watch::Sender<ConnectState>) -> Result<Session> {
		let session = self.create_session(Some(SessionData::pairing(uri))).await?;
		transition(state, ConnectState::SessionCreated);

		if self.config().auto_open_tg_bot() {
			self.open_session(&session, false).await.map_err(|e| match e {
				Error::Configuration(_) | Error::Handoff(_) => e,
				other => Error::Handoff(other.to_string()),
			})?;
		}

		transition(state, ConnectState::HandedOff);
		Ok(session)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::time::Duration;

	use parking_lot::Mutex;

	use super::*;
	use crate::account::tests::account_with;
	use crate::config::StavaxConfig;
	use crate::connector::ConnectorMessage;
	use crate::environment::StaticEnvironment;
	use crate::test_support::{FakeApi, FakeConnector, Outcome};

	#[tokio::test]
	async fn connect_with_uri_creates_session_and_hands_off_once() {
		let api = Arc::new(FakeApi::new());
		let env = Arc::new(StaticEnvironment::mobile());
		let account = account_with(StavaxConfig::new("p1"), Arc::clone(&api), Arc::clone(&env))
			.build()
			.unwrap();

		let session = account.connect(Some("wc:abc@2?relay-protocol=irn")).await.unwrap();
		assert_eq!(session.data.uri.as_deref(), Some("wc:abc@2?relay-protocol=irn"));
		assert_eq!(api.session_requests(), vec![SessionData::pairing("wc:abc@2?relay-protocol=irn")]);
		assert_eq!(
			env.opened_links(),
			vec![format!("https://t.me/stavax_account_bot/app?startapp=sid%3D{}", session.id)]
		);
	}

	#[tokio::test]
	async fn auto_open_disabled_skips_handoff() {
		let api = Arc::new(FakeApi::new());
		let env = Arc::new(StaticEnvironment::mobile());
		let raw = StavaxConfig {
			disable_auto_open_tg_bot: Some(true),
			..StavaxConfig::new("p1")
		};
		let account = account_with(raw, Arc::clone(&api), Arc::clone(&env)).build().unwrap();

		account.connect(Some("wc:abc@2")).await.unwrap();
		assert_eq!(api.session_requests().len(), 1);
		assert!(env.opened_links().is_empty());
	}

	#[tokio::test]
	async fn failed_handoff_fails_connect() {
		let env = Arc::new(StaticEnvironment::mobile().failing_opener());
		let account = account_with(StavaxConfig::new("p1"), Arc::new(FakeApi::new()), env)
			.build()
			.unwrap();
		let err = account.connect(Some("wc:abc@2")).await.unwrap_err();
		assert!(matches!(err, Error::Handoff(_)));
	}

	#[tokio::test]
	async fn session_failure_propagates() {
		let account = account_with(
			StavaxConfig::new("p1"),
			Arc::new(FakeApi::new().failing_sessions()),
			Arc::new(StaticEnvironment::mobile()),
		)
		.build()
		.unwrap();
		let err = account.connect(Some("wc:abc@2")).await.unwrap_err();
		assert!(matches!(err, Error::SessionCreation(_)));
	}

	#[tokio::test]
	async fn repeated_display_uri_creates_a_single_session() {
		let api = Arc::new(FakeApi::new());
		let env = Arc::new(StaticEnvironment::mobile());
		let connector = Arc::new(FakeConnector::wallet_connect(&["wc:first@2", "wc:second@2"]));
		let account = account_with(StavaxConfig::new("p1"), Arc::clone(&api), Arc::clone(&env))
			.connector(connector.clone())
			.build()
			.unwrap();

		let session = account.connect(None).await.unwrap();
		tokio::task::yield_now().await;

		assert_eq!(session.data.uri.as_deref(), Some("wc:first@2"));
		assert_eq!(api.session_requests().len(), 1);
		assert_eq!(env.opened_links().len(), 1);
		assert_eq!(connector.connects(), 1);
	}

	#[tokio::test]
	async fn pairing_attempt_reports_state_progress() {
		let api = Arc::new(FakeApi::new());
		let connector = Arc::new(FakeConnector::wallet_connect(&["wc:first@2"]));
		let account = account_with(StavaxConfig::new("p1"), api, Arc::new(StaticEnvironment::browser()))
			.connector(connector)
			.build()
			.unwrap();

		let attempt = account.start_pairing().unwrap();
		assert_eq!(attempt.state(), ConnectState::PairingStarted);
		let watcher = attempt.watch_state();
		attempt.session().await.unwrap();
		assert_eq!(*watcher.borrow(), ConnectState::HandedOff);
	}

	#[tokio::test]
	async fn empty_display_uri_is_missing_uri() {
		let connector = Arc::new(FakeConnector::new(
			WALLET_CONNECT_CONNECTOR_ID,
			vec![ConnectorMessage::new("display_uri", None)],
			Outcome::AwaitApproval,
		));
		let account = account_with(
			StavaxConfig::new("p1"),
			Arc::new(FakeApi::new()),
			Arc::new(StaticEnvironment::browser()),
		)
		.connector(connector)
		.build()
		.unwrap();

		assert!(matches!(account.connect(None).await, Err(Error::MissingUri)));
	}

	#[tokio::test]
	async fn connector_failure_before_uri_rejects() {
		let connector = Arc::new(FakeConnector::new(
			WALLET_CONNECT_CONNECTOR_ID,
			Vec::new(),
			Outcome::Fail("user closed modal".into()),
		));
		let account = account_with(
			StavaxConfig::new("p1"),
			Arc::new(FakeApi::new()),
			Arc::new(StaticEnvironment::browser()),
		)
		.connector(connector)
		.build()
		.unwrap();

		let err = account.connect(None).await.unwrap_err();
		assert!(matches!(err, Error::Connector(ref m) if m == "user closed modal"), "got {:?}", err);
	}

	#[tokio::test]
	async fn missing_connector_is_configuration_error() {
		let account = account_with(
			StavaxConfig::new("p1"),
			Arc::new(FakeApi::new()),
			Arc::new(StaticEnvironment::browser()),
		)
		.build()
		.unwrap();
		assert!(account.connect(None).await.unwrap_err().is_configuration());
	}

	#[tokio::test]
	async fn wagmi_connect_reports_session_then_result() {
		let api = Arc::new(FakeApi::new());
		let connector = Arc::new(FakeConnector::wallet_connect(&["wc:first@2", "wc:again@2"]));
		let account = account_with(StavaxConfig::new("p1"), Arc::clone(&api), Arc::new(StaticEnvironment::mobile()))
			.connector(connector.clone())
			.build()
			.unwrap();

		let seen: Arc<Mutex<Vec<Session>>> = Arc::default();
		let task = {
			let account = account.clone();
			let seen = Arc::clone(&seen);
			tokio::spawn(async move { account.wagmi_connect(move |s| seen.lock().push(s)).await })
		};

		api.wait_for_sessions(1).await;
		connector.approve();
		let result = task.await.unwrap().unwrap();

		assert_eq!(result, FakeConnector::result());
		let seen = seen.lock();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].data.uri.as_deref(), Some("wc:first@2"));
		assert_eq!(api.session_requests().len(), 1);
	}

	#[tokio::test]
	async fn wagmi_connect_rejects_on_session_failure() {
		let connector = Arc::new(FakeConnector::wallet_connect(&["wc:first@2"]));
		let account = account_with(
			StavaxConfig::new("p1"),
			Arc::new(FakeApi::new().failing_sessions()),
			Arc::new(StaticEnvironment::mobile()),
		)
		.connector(connector.clone())
		.build()
		.unwrap();

		let called = Arc::new(Mutex::new(false));
		let flag = Arc::clone(&called);
		let err = account.wagmi_connect(move |_| *flag.lock() = true).await.unwrap_err();
		assert!(matches!(err, Error::SessionCreation(_)));
		assert!(!*called.lock());
		assert_eq!(connector.connects(), 1);
	}

	fn quick_connector() -> Arc<FakeConnector> {
		Arc::new(FakeConnector::new(
			WALLET_CONNECT_CONNECTOR_ID,
			vec![ConnectorMessage::display_uri("wc:quick@2")],
			Outcome::Approve,
		))
	}

	#[tokio::test(start_paused = true)]
	async fn connector_finishing_during_session_creation_still_hands_off() {
		let api = Arc::new(FakeApi::new().slow_sessions(Duration::from_millis(50)));
		let env = Arc::new(StaticEnvironment::mobile());
		let account = account_with(StavaxConfig::new("p1"), Arc::clone(&api), Arc::clone(&env))
			.connector(quick_connector())
			.build()
			.unwrap();

		let session = account.connect(None).await.unwrap();
		assert_eq!(session.data.uri.as_deref(), Some("wc:quick@2"));
		assert_eq!(api.session_requests().len(), 1);
		assert_eq!(env.opened_links().len(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn wagmi_connect_calls_on_session_when_connector_finishes_first() {
		let api = Arc::new(FakeApi::new().slow_sessions(Duration::from_millis(50)));
		let account = account_with(StavaxConfig::new("p1"), Arc::clone(&api), Arc::new(StaticEnvironment::mobile()))
			.connector(quick_connector())
			.build()
			.unwrap();

		let seen: Arc<Mutex<Vec<Session>>> = Arc::default();
		let sink = Arc::clone(&seen);
		let result = account.wagmi_connect(move |s| sink.lock().push(s)).await.unwrap();

		assert_eq!(result, FakeConnector::result());
		assert_eq!(seen.lock().len(), 1);
		assert_eq!(api.session_requests().len(), 1);
	}

	#[tokio::test]
	async fn injected_mode_without_injected_connector_is_configuration_error() {
		let api = Arc::new(FakeApi::new());
		let raw = StavaxConfig {
			using_injected_mode: Some(true),
			..StavaxConfig::new("p1")
		};
		let account = account_with(raw, Arc::clone(&api), Arc::new(StaticEnvironment::mobile()))
			.connector(Arc::new(FakeConnector::wallet_connect(&["wc:first@2"])))
			.build()
			.unwrap();

		let err = account.wagmi_connect(|_| panic!("no session in injected mode")).await.unwrap_err();
		assert!(err.is_configuration(), "got {:?}", err);
		assert!(err.to_string().contains("register the injected provider"));
		assert!(api.session_requests().is_empty());
	}

	#[tokio::test]
	async fn injected_mode_connects_directly_without_session() {
		let api = Arc::new(FakeApi::new());
		let injected = Arc::new(FakeConnector::new(INJECTED_CONNECTOR_ID, Vec::new(), Outcome::AwaitApproval));
		let raw = StavaxConfig {
			using_injected_mode: Some(true),
			..StavaxConfig::new("p1")
		};
		let account = account_with(raw, Arc::clone(&api), Arc::new(StaticEnvironment::mobile()))
			.connector(injected.clone())
			.build()
			.unwrap();

		injected.approve();
		let result = account
			.wagmi_connect(|_| panic!("no session in injected mode"))
			.await
			.unwrap();
		assert_eq!(result, FakeConnector::result());
		assert!(api.session_requests().is_empty());

		assert!(account.connect(None).await.unwrap_err().is_configuration());
	}
}
