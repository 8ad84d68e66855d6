//! The pair table: which pairs are served and at what rate.

use crate::PricingError;
use maker_config::Config;
use maker_types::{Address, TradingPair, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A positive exchange rate from signer amount to sender amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
	/// Returns `None` unless `value` is strictly positive.
	pub fn new(value: Decimal) -> Option<Self> {
		(value > Decimal::ZERO).then_some(Self(value))
	}

	/// Splits the rate into an integer `(numerator, denominator)` such that
	/// `rate == numerator / denominator` exactly.
	pub(crate) fn as_fraction(&self) -> Option<(U256, U256)> {
		let mantissa = self.0.mantissa();
		if mantissa <= 0 {
			return None;
		}
		// Decimal scale is at most 28, so 10^scale fits in a u128.
		let denominator = 10u128.checked_pow(self.0.scale())?;
		Some((U256::from(mantissa as u128), U256::from(denominator)))
	}
}

impl fmt::Display for Rate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.normalize())
	}
}

/// Configured rates keyed by directed pair.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
	rates: HashMap<TradingPair, Rate>,
}

impl PricingTable {
	/// Builds a table, rejecting non-positive rates.
	pub fn from_pairs<I>(pairs: I) -> Result<Self, PricingError>
	where
		I: IntoIterator<Item = (TradingPair, Decimal)>,
	{
		let mut rates = HashMap::new();
		for (pair, value) in pairs {
			let rate = Rate::new(value).ok_or_else(|| {
				PricingError::Configuration(format!(
					"Rate for pair {} must be positive, got {}",
					pair, value
				))
			})?;
			rates.insert(pair, rate);
		}
		Ok(Self { rates })
	}

	/// Builds the table from the inline pairs and the optional pairs file.
	pub async fn from_config(config: &Config) -> Result<Self, PricingError> {
		let pairs = config
			.pair_rates()
			.await
			.map_err(|e| PricingError::Configuration(e.to_string()))?;
		Self::from_pairs(pairs)
	}

	pub fn is_served(&self, signer_token: Address, sender_token: Address) -> bool {
		self.rates
			.contains_key(&TradingPair::new(signer_token, sender_token))
	}

	pub fn rate(&self, signer_token: Address, sender_token: Address) -> Result<Rate, PricingError> {
		self.rates
			.get(&TradingPair::new(signer_token, sender_token))
			.copied()
			.ok_or_else(|| PricingError::unknown_pair(signer_token, sender_token))
	}

	pub fn pairs(&self) -> impl Iterator<Item = (&TradingPair, &Rate)> {
		self.rates.iter()
	}

	pub fn len(&self) -> usize {
		self.rates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rates.is_empty()
	}
}
