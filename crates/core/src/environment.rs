//! Host-container detection and deep-link opening.
//!
//! Whether the page runs inside the messaging app's web-app container (and on
//! which platform) decides how a session is handed off. Detection and link
//! opening are behind [`EnvironmentProbe`] so the hand-off logic stays
//! testable and the CLI can open links with the system opener.

use parking_lot::Mutex;
use stavax_runtime::{Error, Result};
use url::form_urlencoded;

/// Platform tags reported by mobile host containers.
const MOBILE_PLATFORMS: &[&str] = &["ios", "android", "android_x"];

/// Platform tag used when no host container is detected.
pub const WEB_PLATFORM: &str = "web";

/// Environment the SDK runs in.
pub trait EnvironmentProbe: Send + Sync {
	/// True when running inside the host messaging app's web-app container.
	fn is_host_container(&self) -> bool;

	/// True when the host container runs on a mobile platform.
	fn is_mobile_container(&self) -> bool;

	/// True when the host container runs on a desktop platform.
	fn is_desktop_container(&self) -> bool {
		self.is_host_container() && !self.is_mobile_container()
	}

	/// Launch parameters handed over by the host container, if any.
	fn launch_params(&self) -> Option<LaunchParams> {
		None
	}

	/// Opens `url` through the host's link opener.
	fn open_deep_link(&self, url: &str) -> Result<()>;
}

/// Parameters the host container passes in the page fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
	pub init_data: Option<String>,
	pub version: Option<String>,
	pub platform: Option<String>,
}

impl LaunchParams {
	/// Parses `tgWebAppData`, `tgWebAppVersion` and `tgWebAppPlatform` from a
	/// URL fragment. A leading `#` is accepted.
	pub fn from_fragment(fragment: &str) -> Self {
		let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
		let mut params = LaunchParams::default();
		for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
			let slot = match key.as_ref() {
				"tgWebAppData" => &mut params.init_data,
				"tgWebAppVersion" => &mut params.version,
				"tgWebAppPlatform" => &mut params.platform,
				_ => continue,
			};
			*slot = Some(value.into_owned());
		}
		params
	}

	/// Encodes the known fields back into fragment form.
	pub fn to_fragment(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());
		if let Some(data) = &self.init_data {
			serializer.append_pair("tgWebAppData", data);
		}
		if let Some(version) = &self.version {
			serializer.append_pair("tgWebAppVersion", version);
		}
		if let Some(platform) = &self.platform {
			serializer.append_pair("tgWebAppPlatform", platform);
		}
		serializer.finish()
	}

	/// True when the host handed over init data.
	pub fn is_host_container(&self) -> bool {
		self.init_data.as_deref().is_some_and(|d| !d.is_empty())
	}

	pub fn is_mobile(&self) -> bool {
		self.platform
			.as_deref()
			.is_some_and(|p| MOBILE_PLATFORMS.contains(&p))
	}

	/// Platform tag for envelopes, `web` when unknown.
	pub fn platform_tag(&self) -> &str {
		self.platform.as_deref().unwrap_or(WEB_PLATFORM)
	}
}

/// [`EnvironmentProbe`] with fixed answers that records opened links.
///
/// Used outside any host container and in tests.
#[derive(Debug, Default)]
pub struct StaticEnvironment {
	host: bool,
	mobile: bool,
	launch: Option<LaunchParams>,
	fail_open: bool,
	opened: Mutex<Vec<String>>,
}

impl StaticEnvironment {
	/// Plain browser, no host container.
	pub fn browser() -> Self {
		Self::default()
	}

	/// Mobile host container.
	pub fn mobile() -> Self {
		Self {
			host: true,
			mobile: true,
			..Self::default()
		}
	}

	/// Desktop host container.
	pub fn desktop() -> Self {
		Self {
			host: true,
			..Self::default()
		}
	}

	/// Derives the container kind from launch parameters.
	pub fn from_launch_params(params: LaunchParams) -> Self {
		Self {
			host: params.is_host_container(),
			mobile: params.is_host_container() && params.is_mobile(),
			launch: Some(params),
			..Self::default()
		}
	}

	pub fn with_launch_params(mut self, params: LaunchParams) -> Self {
		self.launch = Some(params);
		self
	}

	/// Makes [`EnvironmentProbe::open_deep_link`] fail.
	pub fn failing_opener(mut self) -> Self {
		self.fail_open = true;
		self
	}

	/// Links passed to [`EnvironmentProbe::open_deep_link`] so far.
	pub fn opened_links(&self) -> Vec<String> {
		self.opened.lock().clone()
	}
}

impl EnvironmentProbe for StaticEnvironment {
	fn is_host_container(&self) -> bool {
		self.host
	}

	fn is_mobile_container(&self) -> bool {
		self.mobile
	}

	fn launch_params(&self) -> Option<LaunchParams> {
		self.launch.clone()
	}

	fn open_deep_link(&self, url: &str) -> Result<()> {
		if self.fail_open {
			return Err(Error::Handoff(format!("link opener refused {}", url)));
		}
		tracing::debug!(%url, "recorded deep link");
		self.opened.lock().push(url.to_string());
		Ok(())
	}
}
