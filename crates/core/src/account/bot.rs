//! Session hand-off and the bot helpers for [`StavaxAccount`].

use std::time::Duration;

use stavax_protocol::{Session, SessionData};
use stavax_runtime::{Error, Result};
use tokio::sync::oneshot;

use super::StavaxAccount;
use crate::handoff::{DelayedHandoff, HandoffRoute, RouteInput, bot_web_app_url, embedded_web_url, select_route};

impl StavaxAccount {
	/// Registers a new session with the account API.
	///
	/// # Errors
	///
	/// Returns [`Error::SessionCreation`] on any network, status, or decoding
	/// failure.
	pub async fn create_session(&self, data: Option<SessionData>) -> Result<Session> {
		self.inner.api.create_session(data.unwrap_or_default()).await
	}

	/// Presents `session` to the wallet host using the route [`select_route`]
	/// picks for this environment.
	///
	/// Embedded-drawer failures are logged and absorbed.
	///
	/// # Errors
	///
	/// - [`Error::Configuration`] if the bot link cannot be built
	/// - [`Error::Handoff`] if the deep-link opener fails
	pub async fn open_session(&self, session: &Session, force: bool) -> Result<()> {
		let config = self.config();
		let environment = self.environment();
		let route = select_route(RouteInput {
			open_for_interact: session.data.is_open_for_interact(),
			injected_mode: config.using_injected_mode(),
			force,
			embedded_mode: config.using_embedded_mode(),
			host_container: environment.is_host_container(),
			mobile_container: environment.is_mobile_container(),
			open_on_desktop: config.open_tg_bot_on_desktop(),
		});
		tracing::debug!(session_id = %session.id, ?route, force, "handing off session");

		match route {
			HandoffRoute::Skip | HandoffRoute::Nothing => Ok(()),
			HandoffRoute::EmbeddedDrawer => {
				self.present_in_drawer(session).await;
				Ok(())
			}
			HandoffRoute::DeepLink => {
				let url = bot_web_app_url(config.tg_bot_web_app_url(), session)?;
				environment.open_deep_link(&url).map_err(|e| match e {
					Error::Handoff(_) => e,
					other => Error::Handoff(other.to_string()),
				})
			}
		}
	}

	async fn present_in_drawer(&self, session: &Session) {
		let Some(drawer) = self.drawer() else {
			tracing::warn!(session_id = %session.id, "embedded mode enabled but no drawer registered");
			return;
		};

		let config = self.config();
		let launch = self.environment().launch_params();
		let presented = match embedded_web_url(config.web_url(), config.project_id(), launch.as_ref()) {
			Ok(url) => drawer.present(&url, session).await,
			Err(e) => Err(e),
		};
		if let Err(e) = presented {
			tracing::warn!(error = %e, session_id = %session.id, "drawer presentation failed");
		}
	}

	/// Opens the bot with a fresh session.
	pub async fn open_bot(&self) -> Result<()> {
		let session = self.create_session(None).await?;
		self.open_session(&session, true).await
	}

	/// Opens the bot for confirming a pending request.
	///
	/// Not forced: nothing is presented outside a host container, and the
	/// hand-off is skipped in injected mode.
	pub async fn open_bot_for_interact(&self) -> Result<()> {
		let session = self.create_session(Some(SessionData::interact())).await?;
		self.open_session(&session, false).await
	}

	/// Schedules [`open_bot_for_interact`](Self::open_bot_for_interact) after
	/// `delay`.
	///
	/// Failures of the scheduled hand-off are logged.
	pub fn open_bot_for_interact_with_delay(&self, delay: Duration) -> DelayedHandoff {
		let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
		let account = self.clone();

		tokio::spawn(async move {
			tokio::select! {
				Ok(()) = cancel_rx => {
					tracing::debug!("delayed interact hand-off cancelled");
					return;
				}
				_ = tokio::time::sleep(delay) => {}
			}
			if let Err(e) = account.open_bot_for_interact().await {
				tracing::warn!(error = %e, "delayed interact hand-off failed");
			}
		});

		DelayedHandoff::new(cancel_tx)
	}

	/// Opens the bot on `screen`.
	pub async fn open_bot_screen(&self, screen: &str) -> Result<()> {
		let session = self.create_session(Some(SessionData::screen(screen))).await?;
		self.open_session(&session, true).await
	}

	/// Opens the bot with an existing session.
	pub async fn open_bot_with_session(&self, session: &Session) -> Result<()> {
		self.open_session(session, true).await
	}

	/// Starts [`open_bot_for_interact`](Self::open_bot_for_interact) without
	/// awaiting it.
	pub(crate) fn spawn_open_bot_for_interact(&self) {
		let account = self.clone();
		tokio::spawn(async move {
			if let Err(e) = account.open_bot_for_interact().await {
				tracing::warn!(error = %e, "interact hand-off failed");
			}
		});
	}
}
