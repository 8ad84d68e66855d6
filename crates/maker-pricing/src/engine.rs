//! Quote computation.
//!
//! Amounts are integer token base units. A rate `m * 10^-s` is applied as
//! `amount * m / 10^s` (or `amount * 10^s / m` for the inverse) in 256-bit
//! arithmetic with one floor division at the end, so results never depend on
//! floating point and round toward zero.

use crate::{PricingError, PricingTable, Rate};
use maker_types::{Address, Quote, U256};
use std::sync::Arc;
use tracing::debug;

/// Fills in the missing amount of a trade from the pair table.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
	table: Arc<PricingTable>,
	/// Signer amount offered by `quote_at_maximum`.
	max_signer_amount: U256,
}

impl QuoteEngine {
	pub fn new(table: Arc<PricingTable>, max_signer_amount: U256) -> Self {
		Self {
			table,
			max_signer_amount,
		}
	}

	pub fn table(&self) -> &PricingTable {
		&self.table
	}

	/// Prices the sender leg from a known signer amount:
	/// `sender_amount = floor(signer_amount * rate)`.
	pub fn quote_given_signer_amount(
		&self,
		signer_token: Address,
		signer_amount: U256,
		sender_token: Address,
	) -> Result<Quote, PricingError> {
		let rate = self.table.rate(signer_token, sender_token)?;
		let sender_amount = apply_rate(signer_amount, &rate)
			.ok_or_else(|| overflow(signer_token, sender_token))?;

		debug!(
			"Priced {} signer -> {} sender at {}",
			signer_amount, sender_amount, rate
		);
		Ok(Quote::new(
			signer_token,
			signer_amount,
			sender_token,
			sender_amount,
		))
	}

	/// Prices the signer leg from a known sender amount:
	/// `signer_amount = floor(sender_amount / rate)`.
	pub fn quote_given_sender_amount(
		&self,
		sender_token: Address,
		sender_amount: U256,
		signer_token: Address,
	) -> Result<Quote, PricingError> {
		let rate = self.table.rate(signer_token, sender_token)?;
		let signer_amount = invert_rate(sender_amount, &rate).ok_or_else(|| {
			if rate.as_fraction().is_none() {
				PricingError::unknown_pair(signer_token, sender_token)
			} else {
				overflow(signer_token, sender_token)
			}
		})?;

		debug!(
			"Priced {} sender -> {} signer at {}",
			sender_amount, signer_amount, rate
		);
		Ok(Quote::new(
			signer_token,
			signer_amount,
			sender_token,
			sender_amount,
		))
	}

	/// Quotes the configured maximum signer amount for the pair.
	pub fn quote_at_maximum(
		&self,
		signer_token: Address,
		sender_token: Address,
	) -> Result<Quote, PricingError> {
		self.quote_given_signer_amount(signer_token, self.max_signer_amount, sender_token)
	}
}

fn overflow(signer_token: Address, sender_token: Address) -> PricingError {
	PricingError::AmountOverflow(format!("{} -> {}", signer_token, sender_token))
}

/// `floor(amount * rate)`, or `None` on overflow.
fn apply_rate(amount: U256, rate: &Rate) -> Option<U256> {
	let (numerator, denominator) = rate.as_fraction()?;
	amount.checked_mul(numerator)?.checked_div(denominator)
}

/// `floor(amount / rate)`, or `None` on overflow or a zero rate.
fn invert_rate(amount: U256, rate: &Rate) -> Option<U256> {
	let (numerator, denominator) = rate.as_fraction()?;
	amount.checked_mul(denominator)?.checked_div(numerator)
}
