//! Configuration builder for creating test and development configurations.

use crate::{AccountConfig, ApiConfig, Config, MakerConfig, PricingConfig, SettlementConfig};
use maker_types::{Address, U256};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Well-known development key (first account of the default anvil mnemonic).
pub const TEST_PRIVATE_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	maker_id: String,
	max_signer_amount: U256,
	private_key: String,
	chain_id: u64,
	deployments: HashMap<u64, Address>,
	pairs: HashMap<String, HashMap<String, Decimal>>,
	api: ApiConfig,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a builder for chain 31337 with one deployment and no pairs.
	pub fn new() -> Self {
		let mut deployments = HashMap::new();
		deployments.insert(31337, Address::repeat_byte(0x5a));
		Self {
			maker_id: "test-maker".to_string(),
			max_signer_amount: U256::from(1000u64),
			private_key: TEST_PRIVATE_KEY.to_string(),
			chain_id: 31337,
			deployments,
			pairs: HashMap::new(),
			api: ApiConfig::default(),
		}
	}

	pub fn maker_id(mut self, id: impl Into<String>) -> Self {
		self.maker_id = id.into();
		self
	}

	pub fn max_signer_amount(mut self, amount: U256) -> Self {
		self.max_signer_amount = amount;
		self
	}

	pub fn private_key(mut self, key: impl Into<String>) -> Self {
		self.private_key = key.into();
		self
	}

	/// Selects the chain and registers `contract` as its deployment.
	pub fn deployment(mut self, chain_id: u64, contract: Address) -> Self {
		self.chain_id = chain_id;
		self.deployments.insert(chain_id, contract);
		self
	}

	/// Adds a `signer_token -> sender_token` rate.
	pub fn pair(mut self, signer_token: Address, sender_token: Address, rate: Decimal) -> Self {
		self.pairs
			.entry(signer_token.to_string())
			.or_default()
			.insert(sender_token.to_string(), rate);
		self
	}

	pub fn api(mut self, api: ApiConfig) -> Self {
		self.api = api;
		self
	}

	/// Builds the `Config` without running validation.
	pub fn build(self) -> Config {
		let mut local = toml::map::Map::new();
		local.insert(
			"private_key".to_string(),
			toml::Value::String(self.private_key),
		);
		let mut implementations = HashMap::new();
		implementations.insert("local".to_string(), toml::Value::Table(local));

		Config {
			maker: MakerConfig {
				id: self.maker_id,
				max_signer_amount: self.max_signer_amount,
			},
			account: AccountConfig {
				primary: "local".to_string(),
				implementations,
			},
			settlement: SettlementConfig {
				chain_id: self.chain_id,
				deployments: self.deployments,
			},
			pricing: PricingConfig {
				pairs_file: None,
				pairs: self.pairs,
			},
			api: self.api,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_builder_produces_valid_config() {
		let a = Address::repeat_byte(0x0a);
		let b = Address::repeat_byte(0x0b);
		let config = ConfigBuilder::new()
			.pair(a, b, Decimal::new(2, 0))
			.deployment(4, Address::repeat_byte(0x44))
			.build();

		config.validate().unwrap();
		assert_eq!(config.signature_scope().unwrap().chain_id, 4);
		assert_eq!(config.pair_rates().await.unwrap().len(), 1);
		assert!(config.primary_account().is_ok());
	}
}
