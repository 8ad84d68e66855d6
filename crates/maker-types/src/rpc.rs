//! JSON-RPC 2.0 envelope types for the maker API.
//!
//! Counterparties talk to the maker with plain JSON-RPC 2.0 over HTTP POST.
//! This module defines the request and response envelopes, the error object,
//! and the parameter record shared by all five maker methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version string carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes used in JSON-RPC error objects.
pub mod error_codes {
	/// The body is not valid JSON.
	pub const PARSE_ERROR: i64 = -32700;
	/// The JSON is not a valid request object.
	pub const INVALID_REQUEST: i64 = -32600;
	/// The method does not exist.
	pub const METHOD_NOT_FOUND: i64 = -32601;
	/// Any internal failure while serving a request.
	pub const INTERNAL_ERROR: i64 = -32603;
	/// The requested token pair has no configured price.
	pub const PAIR_NOT_SERVED: i64 = -33601;
}

/// Message returned alongside [`error_codes::PAIR_NOT_SERVED`].
pub const PAIR_NOT_SERVED_MESSAGE: &str = "Not serving quotes for this token pair";

/// Inbound JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
	#[serde(default)]
	pub jsonrpc: Option<String>,
	pub method: String,
	#[serde(default)]
	pub params: Value,
	#[serde(default)]
	pub id: Value,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
}

impl RpcErrorObject {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	pub fn parse_error() -> Self {
		Self::new(error_codes::PARSE_ERROR, "Parse error")
	}

	pub fn invalid_request() -> Self {
		Self::new(error_codes::INVALID_REQUEST, "Invalid Request")
	}

	pub fn method_not_found() -> Self {
		Self::new(error_codes::METHOD_NOT_FOUND, "Method not found")
	}

	pub fn internal() -> Self {
		Self::new(error_codes::INTERNAL_ERROR, "Internal error")
	}

	pub fn pair_not_served() -> Self {
		Self::new(error_codes::PAIR_NOT_SERVED, PAIR_NOT_SERVED_MESSAGE)
	}
}

/// Outbound JSON-RPC response carrying exactly one of `result` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
	pub jsonrpc: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<RpcErrorObject>,
	pub id: Value,
}

impl RpcResponse {
	pub fn success(id: Value, result: Value) -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION.to_string(),
			result: Some(result),
			error: None,
			id,
		}
	}

	pub fn failure(id: Value, error: RpcErrorObject) -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION.to_string(),
			result: None,
			error: Some(error),
			id,
		}
	}
}

/// Parameters accepted by the maker methods.
///
/// Tokens and wallets are kept as raw strings and amounts as raw JSON values
/// so that the router decides how malformed input is reported. The
/// `signerParam`/`senderParam` spellings are accepted for older takers.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
	pub signer_token: Option<String>,
	pub sender_token: Option<String>,
	pub signer_amount: Option<Value>,
	pub sender_amount: Option<Value>,
	pub signer_wallet: Option<String>,
	pub sender_wallet: Option<String>,
}

impl RequestParams {
	/// Reads each field from a params object on its own.
	///
	/// A token or wallet that is not a JSON string is treated as absent, so a
	/// mistyped field only fails the method that needs it.
	pub fn from_object(params: &Map<String, Value>) -> Self {
		let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_string);
		let amount = |key: &str, legacy: &str| {
			params
				.get(key)
				.or_else(|| params.get(legacy))
				.filter(|value| !value.is_null())
				.cloned()
		};

		Self {
			signer_token: text("signerToken"),
			sender_token: text("senderToken"),
			signer_amount: amount("signerAmount", "signerParam"),
			sender_amount: amount("senderAmount", "senderParam"),
			signer_wallet: text("signerWallet"),
			sender_wallet: text("senderWallet"),
		}
	}
}
