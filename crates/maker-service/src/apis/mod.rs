//! JSON-RPC methods served by the maker.
//!
//! `router` owns the envelope and error mapping; `quote` and `order` hold the
//! per-method business logic.

pub mod order;
pub mod quote;
pub mod router;

use maker_account::AccountError;
use maker_order::OrderError;
use maker_pricing::PricingError;
use maker_types::{parse_amount, Address, RpcErrorObject, U256};
use std::fmt;
use thiserror::Error;

/// The closed set of methods the maker answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
	GetSenderSideQuote,
	GetSignerSideQuote,
	GetMaxQuote,
	GetSenderSideOrder,
	GetSignerSideOrder,
}

impl RequestKind {
	pub const ALL: [RequestKind; 5] = [
		RequestKind::GetSenderSideQuote,
		RequestKind::GetSignerSideQuote,
		RequestKind::GetMaxQuote,
		RequestKind::GetSenderSideOrder,
		RequestKind::GetSignerSideOrder,
	];

	/// Maps a wire method name to its kind.
	pub fn from_method(method: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.method_name() == method)
	}

	pub fn method_name(&self) -> &'static str {
		match self {
			RequestKind::GetSenderSideQuote => "getSenderSideQuote",
			RequestKind::GetSignerSideQuote => "getSignerSideQuote",
			RequestKind::GetMaxQuote => "getMaxQuote",
			RequestKind::GetSenderSideOrder => "getSenderSideOrder",
			RequestKind::GetSignerSideOrder => "getSignerSideOrder",
		}
	}

	/// Whether answering requires a signature.
	pub fn is_order(&self) -> bool {
		matches!(
			self,
			RequestKind::GetSenderSideOrder | RequestKind::GetSignerSideOrder
		)
	}
}

impl fmt::Display for RequestKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.method_name())
	}
}

/// Errors raised while answering a request.
#[derive(Debug, Error)]
pub enum RequestError {
	/// Tokens missing, malformed or not in the pair table.
	#[error("Pair not served")]
	PairNotServed,
	#[error("Method not found: {0}")]
	MethodNotFound(String),
	#[error("Pricing failed: {0}")]
	UnknownPair(#[from] PricingError),
	#[error("Invalid order parameters: {0}")]
	InvalidOrderParameters(String),
	#[error("Signing failed: {0}")]
	Signing(#[from] AccountError),
	/// Malformed envelope or params, or a signer that has been halted.
	#[error("Routing error: {0}")]
	Routing(String),
}

impl From<OrderError> for RequestError {
	fn from(err: OrderError) -> Self {
		RequestError::InvalidOrderParameters(err.to_string())
	}
}

impl From<serde_json::Error> for RequestError {
	fn from(err: serde_json::Error) -> Self {
		RequestError::Routing(err.to_string())
	}
}

impl RequestError {
	/// The error object sent to the counterparty.
	///
	/// Only "pair not served" and "method not found" are distinguishable on
	/// the wire. Everything else is reported as a bare internal error.
	pub fn to_rpc_error(&self) -> RpcErrorObject {
		match self {
			RequestError::PairNotServed => RpcErrorObject::pair_not_served(),
			RequestError::MethodNotFound(_) => RpcErrorObject::method_not_found(),
			RequestError::UnknownPair(_)
			| RequestError::InvalidOrderParameters(_)
			| RequestError::Signing(_)
			| RequestError::Routing(_) => RpcErrorObject::internal(),
		}
	}
}

/// Parses an optional address parameter.
pub(crate) fn parse_address(value: Option<&str>) -> Option<Address> {
	value.and_then(|s| s.trim().parse::<Address>().ok())
}

/// Reads a required amount parameter.
pub(crate) fn required_amount(
	value: Option<&serde_json::Value>,
	name: &str,
) -> Result<U256, RequestError> {
	let value = value
		.ok_or_else(|| RequestError::InvalidOrderParameters(format!("{} is required", name)))?;
	parse_amount(value).map_err(RequestError::InvalidOrderParameters)
}

#[cfg(test)]
mod tests {
	use super::*;
	use maker_types::error_codes;
	use serde_json::json;

	#[test]
	fn test_method_names_round_trip() {
		for kind in RequestKind::ALL {
			assert_eq!(RequestKind::from_method(kind.method_name()), Some(kind));
		}
		assert_eq!(RequestKind::from_method("getQuote"), None);
		assert_eq!(RequestKind::from_method("GETMAXQUOTE"), None);
	}

	#[test]
	fn test_only_orders_need_signatures() {
		assert!(RequestKind::GetSenderSideOrder.is_order());
		assert!(RequestKind::GetSignerSideOrder.is_order());
		assert!(!RequestKind::GetMaxQuote.is_order());
	}

	#[test]
	fn test_internal_errors_are_opaque() {
		let errors = [
			RequestError::InvalidOrderParameters("amount is negative".into()),
			RequestError::Signing(AccountError::SigningFailed("k256 failure".into())),
			RequestError::Routing("signer halted".into()),
		];
		for err in errors {
			let rpc = err.to_rpc_error();
			assert_eq!(rpc.code, error_codes::INTERNAL_ERROR);
			assert_eq!(rpc.message, "Internal error");
		}
		assert_eq!(
			RequestError::PairNotServed.to_rpc_error().code,
			error_codes::PAIR_NOT_SERVED
		);
	}

	#[test]
	fn test_parse_address() {
		let token = Address::repeat_byte(0xab);
		assert_eq!(parse_address(Some(&token.to_string())), Some(token));
		assert_eq!(parse_address(Some("0x1234")), None);
		assert_eq!(parse_address(None), None);
	}

	#[test]
	fn test_required_amount() {
		assert_eq!(
			required_amount(Some(&json!("10")), "signerAmount").unwrap(),
			U256::from(10)
		);
		assert!(required_amount(None, "signerAmount").is_err());
		assert!(required_amount(Some(&json!(-1)), "signerAmount").is_err());
		assert!(required_amount(Some(&json!("1.5")), "signerAmount").is_err());
	}
}
