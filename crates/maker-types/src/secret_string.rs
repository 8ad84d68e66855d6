//! Redacting string type for the maker's signing key.
//!
//! The maker's private key lives in process memory for the lifetime of the
//! service. `SecretString` keeps it out of logs and debug output and zeroes
//! the buffer when the value is dropped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string that zeroes its memory on drop and never prints its contents.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret to a closure.
	///
	/// Keep the closure short and never log what it receives.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(self.0.trim())
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

// Serialized configs are dumped for diagnostics, so the key never leaves.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}
