//! EIP-712 utilities shared across the maker.
//!
//! These helpers provide:
//! - Domain hash computation
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the static field types used in order hashing

use alloy_primitives::{keccak256, Address, FixedBytes, B256, U256};

pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Compute the EIP-712 domain hash
/// (keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))).
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(name.as_bytes()));
	enc.push_b256(&keccak256(version.as_bytes()));
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for static types used in EIP-712 struct hashing.
#[derive(Default)]
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u64(&mut self, v: u64) {
		self.push_u256(U256::from(v));
	}

	/// Fixed-size `bytesN` values are left-aligned in their word.
	pub fn push_bytes4(&mut self, v: &FixedBytes<4>) {
		let mut word = [0u8; 32];
		word[..4].copy_from_slice(v.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
