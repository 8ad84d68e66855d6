//! Pricing module for the swap maker.
//!
//! This module holds the configured exchange rates for every served pair and
//! computes the missing leg of a quote from them. Everything here is pure:
//! the table is built once at startup and only read afterwards.

use maker_types::Address;
use thiserror::Error;

pub mod engine;
pub mod table;

pub use engine::QuoteEngine;
pub use table::{PricingTable, Rate};

/// Errors that can occur while pricing a quote.
#[derive(Debug, Error)]
pub enum PricingError {
	/// The pair has no configured rate.
	#[error("Unknown pair: {signer_token} -> {sender_token}")]
	UnknownPair {
		signer_token: Address,
		sender_token: Address,
	},
	/// The computed amount does not fit in 256 bits.
	#[error("Amount overflow while pricing {0}")]
	AmountOverflow(String),
	/// The pair table could not be built from configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl PricingError {
	pub(crate) fn unknown_pair(signer_token: Address, sender_token: Address) -> Self {
		Self::UnknownPair {
			signer_token,
			sender_token,
		}
	}
}
