//! Local private key account.
//!
//! Holds a secp256k1 key in process memory and signs digests with
//! deterministic (RFC 6979) ECDSA.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry, HashSignature};
use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use maker_types::{
	without_0x_prefix, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, ValidationError,
};
use zeroize::Zeroizing;

/// Account backed by a private key held in memory.
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Creates an account from a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(parse_private_key)?;
		Ok(Self { signer })
	}
}

fn parse_private_key(key: &str) -> Result<PrivateKeySigner, AccountError> {
	let bytes = Zeroizing::new(
		hex::decode(without_0x_prefix(key))
			.map_err(|_| AccountError::InvalidKey("private key is not valid hex".to_string()))?,
	);
	if bytes.len() != 32 {
		return Err(AccountError::InvalidKey(format!(
			"private key must be 32 bytes, got {}",
			bytes.len()
		)));
	}
	PrivateKeySigner::from_bytes(&B256::from_slice(&bytes))
		.map_err(|_| AccountError::InvalidKey("private key is not a valid secp256k1 scalar".to_string()))
}

/// Schema for `[account.implementations.local]`.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = value.as_str().unwrap_or_default().trim();
					let hex_part = without_0x_prefix(key);
					if hex_part.len() != 64 {
						return Err("Private key must be 64 hex characters".to_string());
					}
					if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("Private key must contain only hex characters".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn sign_hash(&self, hash: &B256) -> Result<HashSignature, AccountError> {
		let signature = self
			.signer
			.sign_hash(hash)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(HashSignature::from_rsv(&signature.as_bytes()))
	}
}

/// Creates a local account from its TOML section.
///
/// Required configuration:
/// - `private_key`: 64 hex characters, optionally `0x`-prefixed
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidKey(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalAccount::new(&private_key)?))
}

/// Registry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
