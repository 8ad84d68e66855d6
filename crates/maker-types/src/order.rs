//! Quote and order types for the swap maker.
//!
//! This module defines the records the maker hands to counterparties: the
//! unsigned `Quote`, the settlement-ready `Order` with its `Party` legs, and
//! the typed-data `Signature` attached to an order once it has been signed.

use alloy_primitives::{Address, FixedBytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ERC-20 interface identifier used as the `kind` of fungible token parties.
pub const ERC20_INTERFACE_ID: FixedBytes<4> = FixedBytes([0x36, 0x37, 0x2b, 0x07]);

/// Signature version byte for EIP-712 typed data signatures.
pub const SIGNATURE_VERSION_TYPED_DATA: FixedBytes<1> = FixedBytes([0x01]);

/// An ordered (signer token, sender token) combination.
///
/// Pairs are directional: a rate configured for `A -> B` says nothing about
/// `B -> A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPair {
	/// Token the maker sends.
	pub signer_token: Address,
	/// Token the counterparty sends.
	pub sender_token: Address,
}

impl TradingPair {
	pub fn new(signer_token: Address, sender_token: Address) -> Self {
		Self {
			signer_token,
			sender_token,
		}
	}
}

impl fmt::Display for TradingPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.signer_token, self.sender_token)
	}
}

/// One side of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
	pub token: Address,
	#[serde(with = "u256_serde")]
	pub amount: U256,
}

/// An unsigned, informational pricing of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
	pub signer: TokenAmount,
	pub sender: TokenAmount,
}

impl Quote {
	pub fn new(
		signer_token: Address,
		signer_amount: U256,
		sender_token: Address,
		sender_amount: U256,
	) -> Self {
		Self {
			signer: TokenAmount {
				token: signer_token,
				amount: signer_amount,
			},
			sender: TokenAmount {
				token: sender_token,
				amount: sender_amount,
			},
		}
	}
}

/// One leg of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
	/// Token interface identifier (ERC-20 for every party this maker builds).
	pub kind: FixedBytes<4>,
	pub wallet: Address,
	pub token: Address,
	#[serde(with = "u256_serde")]
	pub amount: U256,
	/// Token id, always zero for fungible tokens.
	#[serde(with = "u256_serde")]
	pub id: U256,
}

impl Party {
	/// Creates a fungible-token party.
	pub fn erc20(wallet: Address, token: Address, amount: U256) -> Self {
		Self {
			kind: ERC20_INTERFACE_ID,
			wallet,
			token,
			amount,
			id: U256::ZERO,
		}
	}

	/// The empty party, used for the affiliate leg.
	pub fn empty() -> Self {
		Self::erc20(Address::ZERO, Address::ZERO, U256::ZERO)
	}
}

/// Typed-data signature over an order digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
	/// Wallet that produced the signature.
	pub signatory: Address,
	/// Settlement contract the signature is valid for.
	pub validator: Address,
	pub version: FixedBytes<1>,
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

impl Signature {
	/// Returns the 65-byte `r || s || v` encoding.
	pub fn to_rsv_bytes(&self) -> [u8; 65] {
		let mut out = [0u8; 65];
		out[..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}
}

/// A settlement-ready swap order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	#[serde(with = "u64_string")]
	pub nonce: u64,
	/// Absolute unix timestamp (seconds) after which the order is void.
	#[serde(with = "u64_string")]
	pub expiry: u64,
	pub signer: Party,
	pub sender: Party,
	pub affiliate: Party,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<Signature>,
}

impl Order {
	pub fn is_signed(&self) -> bool {
		self.signature.is_some()
	}
}

/// The settlement contract and chain a signature is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureScope {
	pub verifying_contract: Address,
	pub chain_id: u64,
}

impl fmt::Display for SignatureScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.verifying_contract, self.chain_id)
	}
}

/// Parses a token amount from a JSON value.
///
/// Accepts decimal strings, `0x`-prefixed hex strings and non-negative
/// integer numbers. Negative, fractional and non-numeric values are rejected.
pub fn parse_amount(value: &serde_json::Value) -> Result<U256, String> {
	match value {
		serde_json::Value::String(s) => parse_amount_str(s),
		serde_json::Value::Number(n) => n
			.as_u64()
			.map(U256::from)
			.ok_or_else(|| format!("Amount must be a non-negative integer: {}", n)),
		other => Err(format!("Amount must be a string or number, got {}", other)),
	}
}

fn parse_amount_str(s: &str) -> Result<U256, String> {
	let trimmed = s.trim();
	let (digits, radix) = match trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
	{
		Some(hex) => (hex, 16),
		None => (trimmed, 10),
	};
	if digits.is_empty() {
		return Err(format!("Invalid amount '{}': no digits", s));
	}
	U256::from_str_radix(digits, radix).map_err(|e| format!("Invalid amount '{}': {}", s, e))
}

/// Serde module for U256 amounts as decimal strings.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = serde_json::Value::deserialize(deserializer)?;
		super::parse_amount(&value).map_err(D::Error::custom)
	}
}

/// Serde module for u64 values carried as decimal strings.
pub mod u64_string {
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = serde_json::Value::deserialize(deserializer)?;
		match value {
			serde_json::Value::String(s) => s.parse::<u64>().map_err(D::Error::custom),
			serde_json::Value::Number(n) => n
				.as_u64()
				.ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {}", n))),
			other => Err(D::Error::custom(format!(
				"expected string or number, got {}",
				other
			))),
		}
	}
}
