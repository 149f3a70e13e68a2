//! Injected-provider channel to the wallet host's parent frame.
//!
//! When the dApp runs inside the wallet host's in-app browser, EIP-1193
//! requests are relayed over `postMessage`. This module implements the
//! request/response correlation on top of a [`MessagePort`]:
//!
//! 1. Caller invokes [`ProviderChannel::request`]
//! 2. A random correlation id is generated and a oneshot channel registered
//! 3. The [`ProviderRequest`] envelope is posted to the parent frame
//! 4. Inbound frame messages are fed to [`ProviderChannel::dispatch`]
//! 5. A message is a reply only if its `from`/`eventType` follow the
//!    provider-response contract and its id is pending; anything else is
//!    ignored
//! 6. The reply resolves the caller's oneshot


use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use stavax_protocol::{PageMetadata, ProviderRequest, ProviderRequestData, ProviderResponse, RpcRequest};
use tokio::sync::{mpsc, oneshot};

use crate::device::random_token;
use crate::error::{Error, Result};

/// Length of generated correlation ids.
const CORRELATION_ID_LEN: usize = 24;

/// Outbound half of a postMessage channel.
///
/// The browser implementation posts to `window.parent`; tests record.
pub trait MessagePort: Send + Sync {
	/// Posts `message` to the wallet host frame.
	fn post_message(&self, message: Value) -> Result<()>;
}

/// Pending request callbacks keyed by correlation id.
type CallbackMap = Arc<Mutex<HashMap<String, oneshot::Sender<Result<Value>>>>>;

/// RAII guard ensuring callback cleanup when a request future is dropped.
struct CancelGuard {
	id: String,
	callbacks: CallbackMap,
	completed: bool,
}

impl CancelGuard {
	fn new(id: String, callbacks: CallbackMap) -> Self {
		Self {
			id,
			callbacks,
			completed: false,
		}
	}

	fn complete(&mut self) {
		self.completed = true;
	}
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		if self.callbacks.lock().remove(&self.id).is_some() {
			tracing::debug!(id = %self.id, "removed orphaned provider callback");
		}
	}
}

/// Future returned by [`ProviderChannel::request`] with automatic cancellation cleanup.
struct ResponseFuture {
	rx: oneshot::Receiver<Result<Value>>,
	guard: CancelGuard,
}

impl Future for ResponseFuture {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(result) => {
				self.guard.complete();
				Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

/// postMessage relay with id correlation.
pub struct ProviderChannel {
	port: Arc<dyn MessagePort>,
	callbacks: CallbackMap,
	platform: String,
	metadata: PageMetadata,
	timeout: Option<Duration>,
}

impl ProviderChannel {
	/// Creates a channel that tags requests with `platform` and `metadata`.
	pub fn new(port: Arc<dyn MessagePort>, platform: impl Into<String>, metadata: PageMetadata) -> Self {
		Self {
			port,
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			platform: platform.into(),
			metadata,
			timeout: None,
		}
	}

	/// Bounds how long [`request`](Self::request) waits for a reply.
	///
	/// Unbounded by default: replies may wait on user confirmation.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Relays `request` to the wallet host and awaits the correlated reply.
	///
	/// # Errors
	///
	/// Returns [`Error::Remote`] when the host answers with `success: false`,
	/// [`Error::Timeout`] when a timeout is configured and elapses, and
	/// [`Error::ChannelClosed`] if the channel is torn down first.
	pub async fn request(&self, request: RpcRequest) -> Result<Value> {
		let id = random_token(CORRELATION_ID_LEN);
		let method = request.method.clone();

		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id.clone(), tx);
		let guard = CancelGuard::new(id.clone(), Arc::clone(&self.callbacks));

		let envelope = ProviderRequest::new(
			id.clone(),
			ProviderRequestData {
				platform: self.platform.clone(),
				request,
				metadata: self.metadata.clone(),
			},
		);
		tracing::debug!(%id, %method, "relaying provider request");
		self.port.post_message(serde_json::to_value(&envelope)?)?;

		let response = ResponseFuture { rx, guard };
		match self.timeout {
			Some(timeout) => tokio::time::timeout(timeout, response)
				.await
				.map_err(|_| Error::Timeout(format!("no reply to {} within {}ms", method, timeout.as_millis())))?,
			None => response.await,
		}
	}

	/// Feeds an inbound frame message to the channel.
	///
	/// Returns true if the message was consumed as a reply.
	pub fn dispatch(&self, message: Value) -> bool {
		let reply: ProviderResponse = match serde_json::from_value(message) {
			Ok(reply) => reply,
			Err(_) => return false,
		};

		if !reply.is_provider_reply() {
			tracing::debug!(id = %reply.id, from = %reply.from, "ignoring message outside provider-response contract");
			return false;
		}

		let Some(callback) = self.callbacks.lock().remove(&reply.id) else {
			tracing::debug!(id = %reply.id, "provider reply for unknown request (ignored)");
			return false;
		};

		let result = if reply.success {
			Ok(reply.event_data)
		} else {
			Err(Error::Remote {
				message: reply.error_message(),
				data: reply.event_data,
			})
		};
		let _ = callback.send(result);
		true
	}

	/// Dispatches every message from `inbound` until the sender closes.
	pub async fn run(&self, mut inbound: mpsc::UnboundedReceiver<Value>) {
		while let Some(message) = inbound.recv().await {
			self.dispatch(message);
		}
		tracing::debug!("provider channel inbound closed");
	}

	/// Number of requests awaiting a reply.
	pub fn pending(&self) -> usize {
		self.callbacks.lock().len()
	}

	/// Page metadata attached to every request.
	pub fn metadata(&self) -> &PageMetadata {
		&self.metadata
	}
}
