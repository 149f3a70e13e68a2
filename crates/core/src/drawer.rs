//! Embedded drawer presenting the wallet web app inside the dApp page.
//!
//! The drawer loads the embedded web app, waits for it to announce readiness
//! with a [`DrawerMessage`] from the configured web origin, then posts the
//! session to it. The platform glue owns the [`DrawerWidget`] and forwards
//! window messages through [`EmbeddedDrawer::deliver`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use stavax_protocol::{DrawerMessage, Session};
use stavax_runtime::{Error, Result};
use tokio::sync::broadcast;
use url::Url;

use crate::config::Config;

/// Overlay hosting the embedded web app.
pub trait DrawerWidget: Send + Sync {
	/// Shows the drawer with `url` loaded.
	fn open(&self, url: &str) -> Result<()>;

	/// Posts `message` into the drawer document, restricted to `target_origin`.
	fn post_message(&self, message: Value, target_origin: &str) -> Result<()>;

	fn close(&self) -> Result<()>;
}

/// Caller-owned drawer shared with [`StavaxAccount`](crate::StavaxAccount).
pub struct EmbeddedDrawer {
	widget: Arc<dyn DrawerWidget>,
	origin: String,
	inbound: broadcast::Sender<DrawerMessage>,
	ready_timeout: Duration,
}

impl EmbeddedDrawer {
	/// Creates a drawer accepting messages from the configured web URL's origin.
	pub fn new(widget: Arc<dyn DrawerWidget>, config: &Config) -> Result<Self> {
		Self::with_origin(widget, config.web_url(), config.request_timeout())
	}

	/// Creates a drawer for `web_url` waiting at most `ready_timeout` for the
	/// ready signal.
	pub fn with_origin(widget: Arc<dyn DrawerWidget>, web_url: &str, ready_timeout: Duration) -> Result<Self> {
		let origin = Url::parse(web_url)
			.map_err(|e| Error::Configuration(format!("Invalid embedded web URL {:?}: {}", web_url, e)))?
			.origin()
			.ascii_serialization();
		let (inbound, _) = broadcast::channel(16);
		Ok(Self {
			widget,
			origin,
			inbound,
			ready_timeout,
		})
	}

	/// Origin messages must come from.
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Feeds a window message received from `origin`.
	///
	/// Returns false when the message is dropped: wrong origin or not a
	/// drawer envelope.
	pub fn deliver(&self, origin: &str, data: Value) -> bool {
		if origin != self.origin {
			tracing::trace!(%origin, expected = %self.origin, "ignoring drawer message from foreign origin");
			return false;
		}
		let Ok(message) = serde_json::from_value::<DrawerMessage>(data) else {
			return false;
		};
		let _ = self.inbound.send(message);
		true
	}

	/// Opens `url`, waits for the ready signal, then posts `session`.
	///
	/// # Errors
	///
	/// Returns [`Error::Timeout`] when the drawer does not signal readiness in
	/// time, or the widget's error when opening or posting fails.
	pub async fn present(&self, url: &str, session: &Session) -> Result<()> {
		let mut rx = self.inbound.subscribe();
		self.widget.open(url)?;

		tokio::time::timeout(self.ready_timeout, async move {
			loop {
				match rx.recv().await {
					Ok(msg) if msg.is_ready() => return Ok(()),
					Ok(_) => continue,
					Err(broadcast::error::RecvError::Lagged(n)) => {
						tracing::warn!(dropped = n, "Drawer message receiver lagged");
					}
					Err(broadcast::error::RecvError::Closed) => return Err(Error::ChannelClosed),
				}
			}
		})
		.await
		.map_err(|_| Error::Timeout("Timeout waiting for drawer ready signal".to_string()))??;

		let message = serde_json::to_value(DrawerMessage::session(session)?)?;
		tracing::debug!(session_id = %session.id, origin = %self.origin, "posting session to drawer");
		self.widget.post_message(message, &self.origin)
	}

	pub fn close(&self) -> Result<()> {
		self.widget.close()
	}
}

impl std::fmt::Debug for EmbeddedDrawer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EmbeddedDrawer")
			.field("origin", &self.origin)
			.field("ready_timeout", &self.ready_timeout)
			.finish()
	}
}
