//! Transport selection for handing a session to the wallet host.
//!
//! [`select_route`] is a pure decision over [`RouteInput`]; the account layer
//! gathers the input from its config and [`EnvironmentProbe`](crate::EnvironmentProbe)
//! and performs the chosen route.

use stavax_protocol::Session;
use stavax_runtime::{Error, Result};
use tokio::sync::oneshot;
use url::Url;

use crate::environment::LaunchParams;

/// How a session reaches the wallet host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffRoute {
	/// The request already flows through the injected channel.
	Skip,
	/// Present the embedded web app in the drawer.
	EmbeddedDrawer,
	/// Redirect to the bot web app.
	DeepLink,
	/// No presentation needed in this environment.
	Nothing,
}

/// Facts the route decision depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteInput {
	pub open_for_interact: bool,
	pub injected_mode: bool,
	pub force: bool,
	pub embedded_mode: bool,
	pub host_container: bool,
	pub mobile_container: bool,
	pub open_on_desktop: bool,
}

/// Picks the hand-off route. The first matching rule wins:
///
/// 1. interact session in injected mode, not forced: [`HandoffRoute::Skip`]
/// 2. embedded mode inside the host container: [`HandoffRoute::EmbeddedDrawer`]
/// 3. forced, mobile container, or desktop container with desktop opening
///    enabled: [`HandoffRoute::DeepLink`]
/// 4. otherwise [`HandoffRoute::Nothing`]
pub fn select_route(input: RouteInput) -> HandoffRoute {
	if input.open_for_interact && input.injected_mode && !input.force {
		return HandoffRoute::Skip;
	}

	if input.embedded_mode && input.host_container {
		return HandoffRoute::EmbeddedDrawer;
	}

	let desktop_container = input.host_container && !input.mobile_container;
	if input.force || input.mobile_container || (desktop_container && input.open_on_desktop) {
		return HandoffRoute::DeepLink;
	}

	HandoffRoute::Nothing
}

/// Bot web-app link starting the given session:
/// `<base>?startapp=sid%3D<id>`.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if `base` is not a valid URL.
pub fn bot_web_app_url(base: &str, session: &Session) -> Result<String> {
	let mut url = parse(base, "bot web-app")?;
	url.query_pairs_mut()
		.append_pair("startapp", &format!("sid={}", session.id));
	Ok(url.into())
}

/// Embedded web-app link for the drawer:
/// `<web_url>?project_id=<id>#tgWebAppData=..&tgWebAppVersion=..&tgWebAppPlatform=..`.
///
/// The fragment is omitted when no launch parameters are known.
pub fn embedded_web_url(web_url: &str, project_id: &str, launch: Option<&LaunchParams>) -> Result<String> {
	let mut url = parse(web_url, "embedded web")?;
	url.query_pairs_mut().append_pair("project_id", project_id);

	let fragment = launch.map(LaunchParams::to_fragment).unwrap_or_default();
	if !fragment.is_empty() {
		url.set_fragment(Some(&fragment));
	}
	Ok(url.into())
}

fn parse(value: &str, what: &str) -> Result<Url> {
	Url::parse(value).map_err(|e| Error::Configuration(format!("Invalid {} URL {:?}: {}", what, value, e)))
}

/// Handle on a hand-off scheduled by
/// [`StavaxAccount::open_bot_for_interact_with_delay`](crate::StavaxAccount::open_bot_for_interact_with_delay).
///
/// Dropping the handle leaves the hand-off scheduled.
#[derive(Debug)]
pub struct DelayedHandoff {
	cancel_tx: oneshot::Sender<()>,
}

impl DelayedHandoff {
	pub(crate) fn new(cancel_tx: oneshot::Sender<()>) -> Self {
		Self { cancel_tx }
	}

	/// Cancels the pending hand-off. No-op once the timer has fired.
	pub fn cancel(self) {
		let _ = self.cancel_tx.send(());
	}
}
