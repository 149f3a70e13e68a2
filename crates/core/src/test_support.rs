//! Fakes of the collaborator traits shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use stavax_protocol::{Session, SessionData, SmartSession, SmartSessionQuery, SmartTransactionRequest};
use stavax_runtime::{Error, Result, WalletApi};
use tokio::sync::{Notify, broadcast};

use crate::chain::{ChainClient, ContractCall, TransactionRequest};
use crate::connector::{ConnectionResult, Connector, ConnectorMessage, WALLET_CONNECT_CONNECTOR_ID};
use crate::drawer::DrawerWidget;

pub const SMART_TX_HASH: TxHash = TxHash::repeat_byte(0x5a);
pub const CHAIN_TX_HASH: TxHash = TxHash::repeat_byte(0xc4);

pub fn sender() -> Address {
	Address::repeat_byte(0x11)
}

pub fn recipient() -> Address {
	Address::repeat_byte(0x22)
}

/// In-memory [`WalletApi`] recording every call.
#[derive(Default)]
pub struct FakeApi {
	sessions: Mutex<Vec<SessionData>>,
	smart_session: Option<String>,
	fail_sessions: bool,
	session_delay: Option<Duration>,
	fail_lookup: bool,
	reject_submissions: bool,
	lookups: Mutex<Vec<SmartSessionQuery>>,
	submissions: Mutex<Vec<SmartTransactionRequest>>,
}

impl FakeApi {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_smart_session(mut self, id: &str) -> Self {
		self.smart_session = Some(id.to_string());
		self
	}

	pub fn failing_sessions(mut self) -> Self {
		self.fail_sessions = true;
		self
	}

	/// Delays every session registration by `delay`.
	pub fn slow_sessions(mut self, delay: Duration) -> Self {
		self.session_delay = Some(delay);
		self
	}

	pub fn failing_lookup(mut self) -> Self {
		self.fail_lookup = true;
		self
	}

	pub fn rejecting_submissions(mut self) -> Self {
		self.reject_submissions = true;
		self
	}

	pub fn session_requests(&self) -> Vec<SessionData> {
		self.sessions.lock().clone()
	}

	pub fn lookups(&self) -> Vec<SmartSessionQuery> {
		self.lookups.lock().clone()
	}

	pub fn submissions(&self) -> Vec<SmartTransactionRequest> {
		self.submissions.lock().clone()
	}

	/// Waits until `n` sessions were requested.
	pub async fn wait_for_sessions(&self, n: usize) {
		tokio::time::timeout(Duration::from_secs(5), async {
			while self.sessions.lock().len() < n {
				tokio::time::sleep(Duration::from_millis(1)).await;
			}
		})
		.await
		.expect("session requests did not arrive");
	}
}

#[async_trait]
impl WalletApi for FakeApi {
	async fn create_session(&self, data: SessionData) -> Result<Session> {
		if let Some(delay) = self.session_delay {
			tokio::time::sleep(delay).await;
		}
		if self.fail_sessions {
			return Err(Error::SessionCreation("account API unavailable".into()));
		}
		let mut sessions = self.sessions.lock();
		sessions.push(data.clone());
		Ok(Session {
			id: format!("sess-{}", sessions.len()),
			data,
		})
	}

	async fn find_smart_session(&self, query: &SmartSessionQuery) -> Result<Option<SmartSession>> {
		self.lookups.lock().push(query.clone());
		if self.fail_lookup {
			return Err(Error::Http("find-session returned 503".into()));
		}
		Ok(self.smart_session.as_ref().map(|id| SmartSession {
			id: id.clone(),
			extra: Map::new(),
		}))
	}

	async fn send_smart_transaction(&self, request: &SmartTransactionRequest) -> Result<TxHash> {
		self.submissions.lock().push(request.clone());
		if self.reject_submissions {
			return Err(Error::SmartSession("spending rule exceeded".into()));
		}
		Ok(SMART_TX_HASH)
	}
}

/// How a [`FakeConnector`] ends its connection attempt.
pub enum Outcome {
	/// Resolve once [`FakeConnector::approve`] is called.
	AwaitApproval,
	/// Resolve right after the scripted messages.
	Approve,
	Fail(String),
}

/// Connector that replays scripted messages when connecting.
pub struct FakeConnector {
	id: String,
	tx: broadcast::Sender<ConnectorMessage>,
	script: Vec<ConnectorMessage>,
	outcome: Outcome,
	approval: Notify,
	connects: AtomicUsize,
}

impl FakeConnector {
	pub fn new(id: &str, script: Vec<ConnectorMessage>, outcome: Outcome) -> Self {
		let (tx, _) = broadcast::channel(16);
		Self {
			id: id.to_string(),
			tx,
			script,
			outcome,
			approval: Notify::new(),
			connects: AtomicUsize::new(0),
		}
	}

	/// WalletConnect connector announcing `uris` in order.
	pub fn wallet_connect(uris: &[&str]) -> Self {
		let script = uris.iter().map(|uri| ConnectorMessage::display_uri(*uri)).collect();
		Self::new(WALLET_CONNECT_CONNECTOR_ID, script, Outcome::AwaitApproval)
	}

	pub fn approve(&self) {
		self.approval.notify_one();
	}

	pub fn connects(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}

	pub fn result() -> ConnectionResult {
		ConnectionResult {
			accounts: vec![sender()],
			chain_id: 8453,
		}
	}
}

#[async_trait]
impl Connector for FakeConnector {
	fn id(&self) -> &str {
		&self.id
	}

	fn subscribe(&self) -> broadcast::Receiver<ConnectorMessage> {
		self.tx.subscribe()
	}

	async fn connect(&self) -> Result<ConnectionResult> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		for message in &self.script {
			let _ = self.tx.send(message.clone());
		}
		match &self.outcome {
			Outcome::AwaitApproval => {
				self.approval.notified().await;
				Ok(Self::result())
			}
			Outcome::Approve => Ok(Self::result()),
			Outcome::Fail(reason) => Err(Error::Connector(reason.clone())),
		}
	}
}

/// Chain client recording submitted transactions.
pub struct FakeChain {
	account: Option<Address>,
	chain_id: u64,
	rejection: Option<String>,
	sent: Mutex<Vec<TransactionRequest>>,
}

impl FakeChain {
	pub fn new() -> Self {
		Self {
			account: Some(sender()),
			chain_id: 8453,
			rejection: None,
			sent: Mutex::new(Vec::new()),
		}
	}

	pub fn disconnected() -> Self {
		Self {
			account: None,
			..Self::new()
		}
	}

	/// Records submissions but fails them with [`Error::Chain`].
	pub fn rejecting(reason: &str) -> Self {
		Self {
			rejection: Some(reason.into()),
			..Self::new()
		}
	}

	pub fn sent(&self) -> Vec<TransactionRequest> {
		self.sent.lock().clone()
	}
}

#[async_trait]
impl ChainClient for FakeChain {
	async fn account(&self) -> Result<Option<Address>> {
		Ok(self.account)
	}

	async fn chain_id(&self) -> Result<u64> {
		Ok(self.chain_id)
	}

	async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash> {
		self.sent.lock().push(request);
		match &self.rejection {
			Some(reason) => Err(Error::Chain(reason.clone())),
			None => Ok(CHAIN_TX_HASH),
		}
	}

	fn encode_function_data(&self, call: &ContractCall) -> Result<Bytes> {
		Ok(Bytes::from(call.function_name.as_bytes().to_vec()))
	}
}

/// Drawer widget recording what it was asked to show and post.
#[derive(Default)]
pub struct RecordingWidget {
	opened: Mutex<Vec<String>>,
	posted: Mutex<Vec<(Value, String)>>,
	opened_signal: Notify,
}

impl RecordingWidget {
	pub fn opened(&self) -> Vec<String> {
		self.opened.lock().clone()
	}

	pub fn posted(&self) -> Vec<(Value, String)> {
		self.posted.lock().clone()
	}

	pub async fn wait_opened(&self) {
		if self.opened.lock().is_empty() {
			self.opened_signal.notified().await;
		}
	}
}

impl DrawerWidget for RecordingWidget {
	fn open(&self, url: &str) -> Result<()> {
		self.opened.lock().push(url.to_string());
		self.opened_signal.notify_one();
		Ok(())
	}

	fn post_message(&self, message: Value, target_origin: &str) -> Result<()> {
		self.posted.lock().push((message, target_origin.to_string()));
		Ok(())
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}
}
