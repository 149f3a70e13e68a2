use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use stavax::SmartSession;
use stavax_protocol::SmartSessionQuery;
use stavax_runtime::{ApiClient, DeviceIdentity, WalletApi};

use super::CommandContext;
use crate::error::{CliError, Result};
use crate::output::{ResultBuilder, print_result};

/// Builds a lookup query from command-line strings.
///
/// `value` accepts decimal or `0x`-prefixed hex wei.
pub fn parse_query(from: &str, chain_id: u64, to: &str, value: &str, data: &str) -> Result<SmartSessionQuery> {
	let sender_address: Address = from.parse().map_err(|e| CliError::invalid("from", format!("{e}")))?;
	let to: Address = to.parse().map_err(|e| CliError::invalid("to", format!("{e}")))?;
	let value: U256 = value.parse().map_err(|e| CliError::invalid("value", format!("{e}")))?;
	let data: Bytes = data.parse().map_err(|e| CliError::invalid("data", format!("{e}")))?;

	Ok(SmartSessionQuery {
		sender_address,
		chain_id,
		to,
		value,
		data,
	})
}

pub async fn find(ctx: &CommandContext, query: SmartSessionQuery) -> Result<()> {
	let config = ctx.config()?;
	let device = Arc::new(DeviceIdentity::new(ctx.storage()));
	let api = ApiClient::new(config.api_url(), config.project_id(), config.request_timeout(), device)?;

	let found = api.find_smart_session(&query).await?;
	tracing::info!(matched = found.is_some(), chain_id = query.chain_id, "smart session lookup");

	let result = ResultBuilder::<Option<SmartSession>>::new("smart-session find").data(found).build();
	print_result(&result, ctx.format());
	Ok(())
}
