use std::sync::Arc;

use serde::Serialize;
use stavax::config::DEFAULT_TG_BOT_WEB_APP_URL;
use stavax::{Session, SessionData, StavaxAccount, bot_web_app_url};
use tracing::info;

use super::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};
use crate::system::SystemEnvironment;

/// Intent flags of `session new`.
#[derive(Debug, Default)]
pub struct NewSession {
	pub path: Option<String>,
	pub interact: bool,
	pub uri: Option<String>,
}

impl NewSession {
	fn into_data(self) -> SessionData {
		SessionData {
			uri: self.uri,
			path: self.path,
			open_for_interact: self.interact.then_some(true),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSessionData {
	session: Session,
	link: String,
	opened: bool,
}

pub async fn new(ctx: &CommandContext, intent: NewSession, open: bool) -> Result<()> {
	let config = ctx.config()?;
	let account = StavaxAccount::builder(config)
		.storage(ctx.storage())
		.environment(Arc::new(SystemEnvironment))
		.build()?;

	let session = account.create_session(Some(intent.into_data())).await?;
	let link = bot_web_app_url(account.config().tg_bot_web_app_url(), &session)?;
	info!(session_id = %session.id, "session created");

	if open {
		account.open_bot_with_session(&session).await?;
	}

	let result = ResultBuilder::new("session new")
		.data(NewSessionData {
			session,
			link,
			opened: open,
		})
		.build();
	print_result(&result, ctx.format());
	Ok(())
}

/// Prints the bot link for an existing session. Only the bot URL is needed,
/// so no project id is required.
pub fn link(ctx: &CommandContext, session_id: String) -> Result<()> {
	let base = ctx
		.raw_config()
		.tg_bot_web_app_url
		.as_deref()
		.unwrap_or(DEFAULT_TG_BOT_WEB_APP_URL);
	let session = Session {
		id: session_id,
		data: SessionData::default(),
	};
	let url = bot_web_app_url(base, &session)?;

	let result = ResultBuilder::new("link").data(url).build();
	print_result(&result, ctx.format());
	Ok(())
}
