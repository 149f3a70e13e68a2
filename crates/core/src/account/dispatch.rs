//! Transaction dispatch for [`StavaxAccount`]: smart-session fast path with
//! fallback to the standard chain-client path.

use std::sync::Arc;

use alloy_primitives::{Bytes, TxHash};
use stavax_protocol::{SmartSessionQuery, SmartTransactionRequest};
use stavax_runtime::{Error, Result};

use super::StavaxAccount;
use crate::chain::{ChainClient, TransactionRequest, WriteContractRequest};

impl StavaxAccount {
	/// Sends a transaction.
	///
	/// With smart sessions enabled, the account API is first asked for a
	/// pre-authorized session covering the transaction; a match is submitted
	/// directly without any wallet UI. Otherwise the wallet host is opened for
	/// confirmation (unless auto-open is disabled) and the transaction goes
	/// through the chain client.
	///
	/// # Errors
	///
	/// - [`Error::SmartSession`] if a matched submission fails and the
	///   fail-safe fallback is disabled
	/// - [`Error::Configuration`] without a chain client
	/// - the chain client's error on the standard path
	pub async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash> {
		let chain = Arc::clone(self.chain()?);

		if self.config().enable_smart_session() {
			if let Some(hash) = self.try_smart_session(chain.as_ref(), &request).await? {
				return Ok(hash);
			}
		}

		if self.config().auto_open_tg_bot() {
			self.spawn_open_bot_for_interact();
		}
		chain.send_transaction(request).await
	}

	/// Encodes a contract call and sends it with
	/// [`send_transaction`](Self::send_transaction).
	pub async fn write_contract(&self, request: WriteContractRequest) -> Result<TxHash> {
		let chain = self.chain()?;
		let mut data = chain.encode_function_data(&request.call)?.to_vec();
		if let Some(suffix) = &request.data_suffix {
			data.extend_from_slice(suffix);
		}

		self.send_transaction(TransactionRequest {
			from: request.from,
			chain_id: request.chain_id,
			to: Some(request.call.address),
			value: request.value,
			data: Some(Bytes::from(data)),
			gas: request.gas,
		})
		.await
	}

	/// Returns the smart-session transaction hash, or `None` to continue on
	/// the standard path.
	async fn try_smart_session(&self, chain: &dyn ChainClient, request: &TransactionRequest) -> Result<Option<TxHash>> {
		let Some(query) = smart_session_query(chain, request).await else {
			return Ok(None);
		};

		let smart_session = match self.inner.api.find_smart_session(&query).await {
			Ok(Some(found)) => found,
			Ok(None) => {
				tracing::debug!(chain_id = query.chain_id, "no matching smart session");
				return Ok(None);
			}
			Err(e) => {
				tracing::warn!(error = %e, "smart session lookup failed, using standard path");
				return Ok(None);
			}
		};

		let submission = SmartTransactionRequest {
			smart_session_id: smart_session.id.clone(),
			transaction: query,
		};
		match self.inner.api.send_smart_transaction(&submission).await {
			Ok(hash) => {
				tracing::debug!(smart_session_id = %smart_session.id, %hash, "sent through smart session");
				Ok(Some(hash))
			}
			Err(e) if self.config().disable_smart_session_fail_safe() => Err(match e {
				Error::SmartSession(_) => e,
				other => Error::SmartSession(other.to_string()),
			}),
			Err(e) => {
				tracing::warn!(
					error = %e,
					smart_session_id = %smart_session.id,
					"smart session submission failed, using standard path"
				);
				Ok(None)
			}
		}
	}
}

/// Fills sender and chain id from the chain client. `None` when the
/// transaction cannot be described to the account API.
async fn smart_session_query(chain: &dyn ChainClient, request: &TransactionRequest) -> Option<SmartSessionQuery> {
	let Some(to) = request.to else {
		tracing::debug!("transaction has no recipient, skipping smart session");
		return None;
	};

	let sender_address = match request.from {
		Some(from) => from,
		None => match chain.account().await {
			Ok(Some(account)) => account,
			Ok(None) => {
				tracing::debug!("no connected account, skipping smart session");
				return None;
			}
			Err(e) => {
				tracing::warn!(error = %e, "could not resolve sender for smart session");
				return None;
			}
		},
	};

	let chain_id = match request.chain_id {
		Some(id) => id,
		None => match chain.chain_id().await {
			Ok(id) => id,
			Err(e) => {
				tracing::warn!(error = %e, "could not resolve chain id for smart session");
				return None;
			}
		},
	};

	Some(SmartSessionQuery {
		sender_address,
		chain_id,
		to,
		value: request.value.unwrap_or_default(),
		data: request.data.clone().unwrap_or_default(),
	})
}
