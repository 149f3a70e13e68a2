//! SDK configuration: raw [`StavaxConfig`] input and resolved [`Config`].
//!
//! The raw form mirrors the JavaScript SDK option names (camelCase JSON) and
//! leaves every field optional. [`resolve_config`] applies defaults, validates
//! URLs, and produces an immutable [`Config`] shared by every component.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stavax_runtime::{Error, Result};
use url::Url;

/// Default account API endpoint.
pub const DEFAULT_API_URL: &str = "https://account-api.stavax.io";

/// Default bot web-app link used for deep-link hand-off.
pub const DEFAULT_TG_BOT_WEB_APP_URL: &str = "https://t.me/stavax_account_bot/app";

/// Default embedded web app shown in the drawer.
pub const DEFAULT_WEB_URL: &str = "https://account.stavax.io";

/// Default timeout for account API requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(60_000);

/// dApp identity shown by the wallet host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappMetadata {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
}

/// Caller-supplied configuration, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StavaxConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub project_id: Option<String>,
	#[serde(default, rename = "apiURL", alias = "apiUrl", skip_serializing_if = "Option::is_none")]
	pub api_url: Option<String>,
	#[serde(
		default,
		rename = "tgBotWebAppURL",
		alias = "tgBotWebAppUrl",
		skip_serializing_if = "Option::is_none"
	)]
	pub tg_bot_web_app_url: Option<String>,
	#[serde(default, rename = "webURL", alias = "webUrl", skip_serializing_if = "Option::is_none")]
	pub web_url: Option<String>,
	/// Milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_timeout: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub disable_auto_open_tg_bot: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub open_tg_bot_on_desktop: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enable_smart_session: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub disable_smart_session_fail_safe: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub using_embedded_mode: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub using_injected_mode: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<DappMetadata>,
}

impl StavaxConfig {
	/// Raw config carrying only a project id.
	pub fn new(project_id: impl Into<String>) -> Self {
		Self {
			project_id: Some(project_id.into()),
			..Default::default()
		}
	}

	/// Loads a raw config from a JSON file.
	pub fn from_file(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		serde_json::from_str(&content)
			.map_err(|e| Error::Configuration(format!("Invalid config file {}: {}", path.display(), e)))
	}

	/// Overlays every field set in `other` onto `self`.
	pub fn merge(&mut self, other: StavaxConfig) {
		macro_rules! overlay {
			($($field:ident),*) => {
				$(if other.$field.is_some() {
					self.$field = other.$field;
				})*
			};
		}
		overlay!(
			project_id,
			api_url,
			tg_bot_web_app_url,
			web_url,
			request_timeout,
			disable_auto_open_tg_bot,
			open_tg_bot_on_desktop,
			enable_smart_session,
			disable_smart_session_fail_safe,
			using_embedded_mode,
			using_injected_mode,
			metadata
		);
	}
}

/// Resolved, immutable configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	project_id: String,
	api_url: String,
	tg_bot_web_app_url: String,
	web_url: String,
	request_timeout: Duration,
	disable_auto_open_tg_bot: bool,
	open_tg_bot_on_desktop: bool,
	enable_smart_session: bool,
	disable_smart_session_fail_safe: bool,
	using_embedded_mode: bool,
	using_injected_mode: bool,
	metadata: DappMetadata,
}

impl Config {
	pub fn project_id(&self) -> &str {
		&self.project_id
	}

	pub fn api_url(&self) -> &str {
		&self.api_url
	}

	pub fn tg_bot_web_app_url(&self) -> &str {
		&self.tg_bot_web_app_url
	}

	pub fn web_url(&self) -> &str {
		&self.web_url
	}

	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}

	/// True unless `disableAutoOpenTgBot` was set.
	pub fn auto_open_tg_bot(&self) -> bool {
		!self.disable_auto_open_tg_bot
	}

	pub fn open_tg_bot_on_desktop(&self) -> bool {
		self.open_tg_bot_on_desktop
	}

	pub fn enable_smart_session(&self) -> bool {
		self.enable_smart_session
	}

	/// True when a failed smart-session submission must surface instead of
	/// falling back to the standard path.
	pub fn disable_smart_session_fail_safe(&self) -> bool {
		self.disable_smart_session_fail_safe
	}

	pub fn using_embedded_mode(&self) -> bool {
		self.using_embedded_mode
	}

	pub fn using_injected_mode(&self) -> bool {
		self.using_injected_mode
	}

	pub fn metadata(&self) -> &DappMetadata {
		&self.metadata
	}
}

/// Applies defaults to `raw` and validates the result.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when the project id is missing, blank or
/// padded with whitespace, or when any URL fails to parse. The id is used
/// exactly as given.
pub fn resolve_config(raw: &StavaxConfig) -> Result<Config> {
	let project_id = raw
		.project_id
		.as_deref()
		.filter(|id| !id.trim().is_empty())
		.ok_or_else(|| Error::Configuration("projectId is required; pass the id from the Stavax dashboard".into()))?;
	if project_id.trim() != project_id {
		return Err(Error::Configuration(format!(
			"projectId {:?} has surrounding whitespace",
			project_id
		)));
	}
	let project_id = project_id.to_string();

	let api_url = validate_url("apiURL", raw.api_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
	let tg_bot_web_app_url = validate_url(
		"tgBotWebAppURL",
		raw.tg_bot_web_app_url.as_deref().unwrap_or(DEFAULT_TG_BOT_WEB_APP_URL),
	)?;
	let web_url = validate_url("webURL", raw.web_url.as_deref().unwrap_or(DEFAULT_WEB_URL))?;

	let request_timeout = match raw.request_timeout {
		Some(0) => return Err(Error::Configuration("requestTimeout must be greater than zero".into())),
		Some(ms) => Duration::from_millis(ms),
		None => DEFAULT_REQUEST_TIMEOUT,
	};

	Ok(Config {
		project_id,
		api_url,
		tg_bot_web_app_url,
		web_url,
		request_timeout,
		disable_auto_open_tg_bot: raw.disable_auto_open_tg_bot.unwrap_or(false),
		open_tg_bot_on_desktop: raw.open_tg_bot_on_desktop.unwrap_or(false),
		enable_smart_session: raw.enable_smart_session.unwrap_or(false),
		disable_smart_session_fail_safe: raw.disable_smart_session_fail_safe.unwrap_or(false),
		using_embedded_mode: raw.using_embedded_mode.unwrap_or(false),
		using_injected_mode: raw.using_injected_mode.unwrap_or(false),
		metadata: raw.metadata.clone().unwrap_or_default(),
	})
}

fn validate_url(field: &str, value: &str) -> Result<String> {
	let parsed = Url::parse(value).map_err(|e| Error::Configuration(format!("{} {:?} is not a valid URL: {}", field, value, e)))?;
	match parsed.scheme() {
		"http" | "https" => Ok(value.to_string()),
		other => Err(Error::Configuration(format!(
			"{} must use http or https, got {:?}",
			field, other
		))),
	}
}
