//! Account management module for the swap maker.
//!
//! This module provides the abstraction over the maker's signing key and the
//! order signer built on top of it. The key is supplied once at startup and
//! never leaves the account implementation; callers only ever see digests and
//! signatures.

use async_trait::async_trait;
use maker_types::{Address, ImplementationRegistry, B256};
use thiserror::Error;

pub mod implementations {
	pub mod local;
}
pub mod signer;

pub use signer::{verify_order, OrderSigner};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when the account configuration is unusable.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// ECDSA signature over a 32-byte digest, with `v` as 27 or 28.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSignature {
	pub r: B256,
	pub s: B256,
	pub v: u8,
}

impl HashSignature {
	/// Splits a 65-byte `r || s || v` signature, normalising `v` to 27/28.
	pub fn from_rsv(bytes: &[u8; 65]) -> Self {
		let v = bytes[64];
		Self {
			r: B256::from_slice(&bytes[..32]),
			s: B256::from_slice(&bytes[32..64]),
			v: if v < 27 { v + 27 } else { v },
		}
	}
}

/// Trait defining the interface for account implementations.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address of the account, used as the signer wallet of every order.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs a precomputed 32-byte digest without any message prefix.
	async fn sign_hash(&self, hash: &B256) -> Result<HashSignature, AccountError>;
}

/// Builds an account from its TOML section.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Returns every available account implementation as `(name, factory)`.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service that manages account operations.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Creates the service from the named implementation and its config.
	pub fn from_config(name: &str, config: &toml::Value) -> Result<Self, AccountError> {
		let factory = get_all_implementations()
			.into_iter()
			.find(|(implementation, _)| *implementation == name)
			.map(|(_, factory)| factory)
			.ok_or_else(|| {
				AccountError::Implementation(format!("Unknown account implementation '{}'", name))
			})?;
		Ok(Self::new(factory(config)?))
	}

	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	pub async fn sign_hash(&self, hash: &B256) -> Result<HashSignature, AccountError> {
		self.implementation.sign_hash(hash).await
	}
}
