//! Builds unsigned orders with a fixed validity window and a time-bucketed
//! nonce.
//!
//! The nonce is `floor(now / window)`, so every order built within the same
//! window shares one nonce. This caps how fast distinct nonces are minted; it
//! is not a uniqueness guarantee.

use crate::{OrderError, DEFAULT_EXPIRY_SECONDS, DEFAULT_NONCE_WINDOW_SECONDS};
use maker_types::{Address, Order, Party, U256};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct OrderBuilder {
	expiry_seconds: u64,
	nonce_window_seconds: u64,
}

impl Default for OrderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl OrderBuilder {
	/// A builder with a 180 second expiry and a 10 second nonce window.
	pub fn new() -> Self {
		Self {
			expiry_seconds: DEFAULT_EXPIRY_SECONDS,
			nonce_window_seconds: DEFAULT_NONCE_WINDOW_SECONDS,
		}
	}

	pub fn expiry_for(&self, now: u64) -> Option<u64> {
		now.checked_add(self.expiry_seconds)
	}

	pub fn nonce_for(&self, now: u64) -> u64 {
		now / self.nonce_window_seconds
	}

	/// Builds an unsigned order at unix time `now` (seconds).
	#[allow(clippy::too_many_arguments)]
	pub fn build(
		&self,
		signer_wallet: Address,
		signer_token: Address,
		signer_amount: U256,
		sender_wallet: Address,
		sender_token: Address,
		sender_amount: U256,
		now: u64,
	) -> Result<Order, OrderError> {
		for (field, address) in [
			("signer wallet", signer_wallet),
			("signer token", signer_token),
			("sender wallet", sender_wallet),
			("sender token", sender_token),
		] {
			if address.is_zero() {
				return Err(OrderError::InvalidParameters(format!(
					"{} cannot be the zero address",
					field
				)));
			}
		}
		if signer_token == sender_token {
			return Err(OrderError::InvalidParameters(
				"signer and sender token must differ".to_string(),
			));
		}

		let expiry = self.expiry_for(now).ok_or_else(|| {
			OrderError::InvalidParameters(format!("timestamp {} is out of range", now))
		})?;
		let nonce = self.nonce_for(now);

		debug!("Built order with nonce {} expiring at {}", nonce, expiry);

		Ok(Order {
			nonce,
			expiry,
			signer: Party::erc20(signer_wallet, signer_token, signer_amount),
			sender: Party::erc20(sender_wallet, sender_token, sender_amount),
			affiliate: Party::empty(),
			signature: None,
		})
	}
}
