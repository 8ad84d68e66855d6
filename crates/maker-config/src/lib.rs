//! Configuration module for the swap maker.
//!
//! This module provides structures and utilities for managing maker
//! configuration. It supports loading configuration from TOML files and
//! validates that the pair table, signing account and settlement deployment
//! are usable before the service accepts requests.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

#[cfg(any(test, feature = "testing"))]
pub mod builders;
mod loader;

use maker_types::{u256_serde, Address, SignatureScope, TradingPair, U256};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML or JSON configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the maker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Maker identity and quoting limits.
	pub maker: MakerConfig,
	/// Signing account configuration.
	pub account: AccountConfig,
	/// Chain and settlement contract the maker signs for.
	pub settlement: SettlementConfig,
	/// Configured trade prices.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// HTTP API bind settings.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Maker identity and quoting limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MakerConfig {
	/// Name used in logs.
	pub id: String,
	/// Ceiling on the signer amount of any single quote, in token base units.
	#[serde(
		default = "default_max_signer_amount",
		with = "u256_serde"
	)]
	pub max_signer_amount: U256,
}

fn default_max_signer_amount() -> U256 {
	U256::from(1000u64)
}

/// Configuration for account management.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Chain selection and the settlement deployment registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettlementConfig {
	/// Chain the maker signs orders for.
	pub chain_id: u64,
	/// Swap contract address per chain id.
	#[serde(deserialize_with = "deserialize_deployments")]
	pub deployments: HashMap<u64, Address>,
}

/// Configured trade prices.
///
/// `pairs` maps signer token -> sender token -> rate, where the rate converts
/// a signer amount into the sender amount.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Optional JSON file with the same layout as `pairs`. Inline pairs win
	/// when both define the same pair.
	#[serde(default)]
	pub pairs_file: Option<PathBuf>,
	#[serde(default)]
	pub pairs: HashMap<String, HashMap<String, Decimal>>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			max_request_size: default_max_request_size(),
		}
	}
}

fn default_api_host() -> String {
	"0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
	8080
}

fn default_max_request_size() -> usize {
	64 * 1024
}

/// Deserializes the deployment registry, whose chain ids arrive as string
/// keys since TOML tables cannot have numeric keys.
fn deserialize_deployments<'de, D>(deserializer: D) -> Result<HashMap<u64, Address>, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, Address> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::with_capacity(string_map.len());

	for (key, address) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, address);
	}

	Ok(result)
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply in reverse so earlier offsets stay valid
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables and
	/// `include` directives.
	///
	/// A relative `pricing.pairs_file` is resolved against the directory of
	/// the configuration file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		let mut config = loader.load_config(file_name).await?;

		if let Some(pairs_file) = config.pricing.pairs_file.as_mut() {
			if pairs_file.is_relative() {
				*pairs_file = base_dir.join(&*pairs_file);
			}
		}

		Ok(config)
	}

	/// Overrides the chain the maker signs for.
	///
	/// The chain must have a registered deployment.
	pub fn with_chain_id(mut self, chain_id: u64) -> Result<Self, ConfigError> {
		self.settlement.chain_id = chain_id;
		self.signature_scope()?;
		Ok(self)
	}

	/// Returns the signature scope for the configured chain.
	pub fn signature_scope(&self) -> Result<SignatureScope, ConfigError> {
		let chain_id = self.settlement.chain_id;
		let verifying_contract = self
			.settlement
			.deployments
			.get(&chain_id)
			.copied()
			.ok_or_else(|| {
				ConfigError::Validation(format!(
					"No Swap contract found for chain ID {}",
					chain_id
				))
			})?;
		Ok(SignatureScope {
			verifying_contract,
			chain_id,
		})
	}

	/// Returns the configured account section for the primary implementation.
	pub fn primary_account(&self) -> Result<(&str, &toml::Value), ConfigError> {
		let primary = self.account.primary.as_str();
		self.account
			.implementations
			.get(primary)
			.map(|value| (primary, value))
			.ok_or_else(|| {
				ConfigError::Validation(format!(
					"Primary account '{}' not found in implementations",
					primary
				))
			})
	}

	/// Collects every configured pair and its rate.
	///
	/// Pairs from `pricing.pairs_file` are read first and inline pairs are
	/// layered on top. Token identifiers must be valid addresses and rates
	/// must be positive.
	pub async fn pair_rates(&self) -> Result<Vec<(TradingPair, Decimal)>, ConfigError> {
		let mut merged: HashMap<TradingPair, Decimal> = HashMap::new();

		if let Some(path) = &self.pricing.pairs_file {
			let content = tokio::fs::read_to_string(path).await.map_err(|e| {
				ConfigError::Io(std::io::Error::new(
					e.kind(),
					format!("Cannot read pairs file {}: {}", path.display(), e),
				))
			})?;
			let from_file: HashMap<String, HashMap<String, Decimal>> =
				serde_json::from_str(&content).map_err(|e| {
					ConfigError::Parse(format!("Invalid pairs file {}: {}", path.display(), e))
				})?;
			collect_pairs(&from_file, &mut merged)?;
		}

		collect_pairs(&self.pricing.pairs, &mut merged)?;

		let mut pairs: Vec<_> = merged.into_iter().collect();
		pairs.sort_by(|a, b| {
			(a.0.signer_token, a.0.sender_token).cmp(&(b.0.signer_token, b.0.sender_token))
		});
		Ok(pairs)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.maker.id.trim().is_empty() {
			return Err(ConfigError::Validation("Maker ID cannot be empty".into()));
		}
		if self.maker.max_signer_amount.is_zero() {
			return Err(ConfigError::Validation(
				"max_signer_amount must be greater than 0".into(),
			));
		}

		if self.account.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"Account implementation cannot be empty".into(),
			));
		}
		self.primary_account()?;

		if self.settlement.deployments.is_empty() {
			return Err(ConfigError::Validation(
				"At least one settlement deployment must be configured".into(),
			));
		}
		for (chain_id, address) in &self.settlement.deployments {
			if address.is_zero() {
				return Err(ConfigError::Validation(format!(
					"Deployment for chain {} cannot be the zero address",
					chain_id
				)));
			}
		}
		self.signature_scope()?;

		// Inline pairs are checked here; a pairs file is checked when read.
		collect_pairs(&self.pricing.pairs, &mut HashMap::new())?;
		if self.pricing.pairs.is_empty() && self.pricing.pairs_file.is_none() {
			return Err(ConfigError::Validation(
				"At least one trading pair must be configured".into(),
			));
		}

		if self.api.port == 0 {
			return Err(ConfigError::Validation("API port cannot be 0".into()));
		}

		Ok(())
	}
}

fn collect_pairs(
	raw: &HashMap<String, HashMap<String, Decimal>>,
	into: &mut HashMap<TradingPair, Decimal>,
) -> Result<(), ConfigError> {
	for (signer_token, senders) in raw {
		let signer = parse_token(signer_token)?;
		for (sender_token, rate) in senders {
			let sender = parse_token(sender_token)?;
			if *rate <= Decimal::ZERO {
				return Err(ConfigError::Validation(format!(
					"Rate for pair {} -> {} must be positive, got {}",
					signer_token, sender_token, rate
				)));
			}
			into.insert(TradingPair::new(signer, sender), *rate);
		}
	}
	Ok(())
}

fn parse_token(token: &str) -> Result<Address, ConfigError> {
	token
		.trim()
		.parse::<Address>()
		.map_err(|e| ConfigError::Validation(format!("Invalid token address '{}': {}", token, e)))
}

/// Parses configuration from a TOML string. Environment variables are
/// resolved and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	const TOKEN_A: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
	const TOKEN_B: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
	const SWAP: &str = "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0";

	fn base_config(extra: &str) -> String {
		format!(
			r#"
[maker]
id = "test-maker"

[account]
primary = "local"
[account.implementations.local]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[settlement]
chain_id = 31337
[settlement.deployments]
31337 = "{SWAP}"

{extra}
"#
		)
	}

	fn with_inline_pair(rate: &str) -> String {
		base_config(&format!(
			"[pricing.pairs.\"{TOKEN_A}\"]\n\"{TOKEN_B}\" = \"{rate}\"\n"
		))
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_MAKER_HOST", "localhost");
		std::env::set_var("TEST_MAKER_PORT", "5432");

		let input = "host = \"${TEST_MAKER_HOST}:${TEST_MAKER_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_MAKER_HOST");
		std::env::remove_var("TEST_MAKER_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_MAKER_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_MAKER_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_MAKER_VAR"));
	}

	#[tokio::test]
	async fn test_parse_minimal_config() {
		let config: Config = with_inline_pair("2.0").parse().unwrap();

		assert_eq!(config.maker.id, "test-maker");
		assert_eq!(config.maker.max_signer_amount, U256::from(1000u64));
		assert_eq!(config.api.port, 8080);

		let scope = config.signature_scope().unwrap();
		assert_eq!(scope.chain_id, 31337);
		assert_eq!(scope.verifying_contract, SWAP.parse::<Address>().unwrap());

		let pairs = config.pair_rates().await.unwrap();
		assert_eq!(pairs.len(), 1);
		assert_eq!(pairs[0].0.signer_token, TOKEN_A.parse::<Address>().unwrap());
		assert_eq!(pairs[0].1, Decimal::from_str("2.0").unwrap());
	}

	#[test]
	fn test_max_signer_amount_accepts_string() {
		let toml = with_inline_pair("1").replace(
			"id = \"test-maker\"",
			"id = \"test-maker\"\nmax_signer_amount = \"5000000000000000000000\"",
		);
		let config: Config = toml.parse().unwrap();
		assert_eq!(
			config.maker.max_signer_amount,
			U256::from(5_000_000_000_000_000_000_000u128)
		);
	}

	#[test]
	fn test_missing_deployment_for_chain_is_fatal() {
		let toml = with_inline_pair("2.0").replace("chain_id = 31337", "chain_id = 1");
		let err = toml.parse::<Config>().unwrap_err();
		assert!(err
			.to_string()
			.contains("No Swap contract found for chain ID 1"));
	}

	#[test]
	fn test_with_chain_id_override() {
		let config: Config = with_inline_pair("2.0").parse().unwrap();
		assert!(config.clone().with_chain_id(31337).is_ok());
		assert!(config.with_chain_id(5).is_err());
	}

	#[test]
	fn test_non_positive_rate_rejected() {
		assert!(with_inline_pair("0").parse::<Config>().is_err());
		assert!(with_inline_pair("-1.5").parse::<Config>().is_err());
	}

	#[test]
	fn test_invalid_token_rejected() {
		let toml = base_config("[pricing.pairs.\"not-a-token\"]\n\"0x01\" = \"1\"\n");
		let err = toml.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Invalid token address"));
	}

	#[test]
	fn test_no_pairs_rejected() {
		let err = base_config("").parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("trading pair"));
	}

	#[test]
	fn test_unknown_primary_account_rejected() {
		let toml = with_inline_pair("2.0").replace("primary = \"local\"", "primary = \"kms\"");
		let err = toml.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary account 'kms'"));
	}

	#[tokio::test]
	async fn test_pairs_file_merged_with_inline_pairs() {
		let temp_dir = TempDir::new().unwrap();
		let pairs_json = format!(r#"{{ "{TOKEN_A}": {{ "{TOKEN_B}": 3.5 }}, "{TOKEN_B}": {{ "{TOKEN_A}": 0.25 }} }}"#);
		std::fs::write(temp_dir.path().join("pairs.json"), pairs_json).unwrap();

		let toml = with_inline_pair("2.0").replace(
			"[pricing.pairs.",
			"[pricing]\npairs_file = \"pairs.json\"\n\n[pricing.pairs.",
		);
		let config_path = temp_dir.path().join("config.toml");
		std::fs::write(&config_path, toml).unwrap();

		let config = Config::from_file(config_path.to_str().unwrap())
			.await
			.unwrap();
		let pairs: HashMap<TradingPair, Decimal> = config.pair_rates().await.unwrap().into_iter().collect();

		let a: Address = TOKEN_A.parse().unwrap();
		let b: Address = TOKEN_B.parse().unwrap();
		assert_eq!(pairs.len(), 2);
		// inline rate overrides the file
		assert_eq!(pairs[&TradingPair::new(a, b)], Decimal::from_str("2.0").unwrap());
		assert_eq!(pairs[&TradingPair::new(b, a)], Decimal::from_str("0.25").unwrap());
	}

	#[tokio::test]
	async fn test_missing_pairs_file_is_io_error() {
		let temp_dir = TempDir::new().unwrap();
		let mut config: Config = with_inline_pair("2.0").parse().unwrap();
		config.pricing.pairs_file = Some(temp_dir.path().join("absent.json"));

		let err = config.pair_rates().await.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
		assert!(err.to_string().contains("Cannot read pairs file"));
	}
}
