//! Order construction module for the swap maker.
//!
//! This module turns a fully priced trade into the canonical order record the
//! settlement contract understands, and computes the EIP-712 digest of that
//! record under a given signature scope.

use thiserror::Error;

pub mod builder;
pub mod hash;

pub use builder::OrderBuilder;
pub use hash::{order_hash, party_hash, DOMAIN_NAME, DOMAIN_VERSION, ORDER_TYPE, PARTY_TYPE};

/// Seconds an order stays valid after it is built.
pub const DEFAULT_EXPIRY_SECONDS: u64 = 180;

/// Width of the time bucket a nonce is derived from.
pub const DEFAULT_NONCE_WINDOW_SECONDS: u64 = 10;

/// Errors that can occur while building an order.
#[derive(Debug, Error)]
pub enum OrderError {
	/// Wallets, tokens or timestamps that cannot form a settleable order.
	#[error("Invalid order parameters: {0}")]
	InvalidParameters(String),
}
