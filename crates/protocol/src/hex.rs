//! Fixed-width hex encoding for 256-bit quantities.
//!
//! The account API expects transaction values as 32-byte, zero-padded,
//! `0x`-prefixed hex strings (66 characters in total).

use alloy_primitives::U256;
use alloy_primitives::hex;
use serde::{Deserialize, Deserializer, Serializer};

/// Encodes `value` as `0x` followed by exactly 64 lowercase hex digits.
pub fn to_fixed_hex(value: U256) -> String {
	hex::encode_prefixed(value.to_be_bytes::<32>())
}

/// Serde adapter for `#[serde(with = "stavax_protocol::hex::fixed")]`.
pub mod fixed {
	use super::*;

	pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&to_fixed_hex(*value))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse::<U256>().map_err(serde::de::Error::custom)
	}
}
