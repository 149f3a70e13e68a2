//! Chain client seam used by the transaction dispatcher.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde_json::Value;
use stavax_runtime::Result;

/// Transaction as submitted by the dApp.
///
/// Unset fields are filled by the chain client (sender, chain) or default to
/// zero (value) and empty (data).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
	pub from: Option<Address>,
	pub chain_id: Option<u64>,
	pub to: Option<Address>,
	pub value: Option<U256>,
	pub data: Option<Bytes>,
	pub gas: Option<u64>,
}

/// Contract function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
	pub address: Address,
	/// JSON ABI of the contract (or of the function).
	pub abi: Value,
	pub function_name: String,
	pub args: Vec<Value>,
}

/// Contract write forwarded through [`StavaxAccount::write_contract`](crate::StavaxAccount::write_contract).
#[derive(Debug, Clone, PartialEq)]
pub struct WriteContractRequest {
	pub call: ContractCall,
	pub from: Option<Address>,
	pub chain_id: Option<u64>,
	pub value: Option<U256>,
	/// Bytes appended to the encoded call data.
	pub data_suffix: Option<Bytes>,
	pub gas: Option<u64>,
}

impl WriteContractRequest {
	pub fn new(call: ContractCall) -> Self {
		Self {
			call,
			from: None,
			chain_id: None,
			value: None,
			data_suffix: None,
			gas: None,
		}
	}
}

/// Standard transaction path of the wallet-connection library.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Connected account, if any.
	async fn account(&self) -> Result<Option<Address>>;

	/// Chain id the client currently targets.
	async fn chain_id(&self) -> Result<u64>;

	/// Submits `request` through the connected wallet.
	async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash>;

	/// ABI-encodes a contract call.
	fn encode_function_data(&self, call: &ContractCall) -> Result<Bytes>;
}
