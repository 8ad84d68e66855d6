//! EIP-712 hashing of swap orders.
//!
//! Builds the `Order` struct hash over its three parties and wraps it in the
//! `SWAP` version `2` domain for a given chain and settlement contract.

use alloy_primitives::keccak256;
use maker_types::{
	utils::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder},
	Order, Party, SignatureScope, B256,
};

pub const DOMAIN_NAME: &str = "SWAP";
pub const DOMAIN_VERSION: &str = "2";

pub const PARTY_TYPE: &str =
	"Party(bytes4 kind,address wallet,address token,uint256 amount,uint256 id)";
pub const ORDER_TYPE: &str =
	"Order(uint256 nonce,uint256 expiry,Party signer,Party sender,Party affiliate)";

/// Struct hash of one order leg.
pub fn party_hash(party: &Party) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(PARTY_TYPE.as_bytes()));
	enc.push_bytes4(&party.kind);
	enc.push_address(&party.wallet);
	enc.push_address(&party.token);
	enc.push_u256(party.amount);
	enc.push_u256(party.id);
	keccak256(enc.finish())
}

fn order_struct_hash(order: &Order) -> B256 {
	// Referenced struct types are appended to the primary type string.
	let order_type_hash = keccak256(format!("{}{}", ORDER_TYPE, PARTY_TYPE).as_bytes());

	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&order_type_hash);
	enc.push_u64(order.nonce);
	enc.push_u64(order.expiry);
	enc.push_b256(&party_hash(&order.signer));
	enc.push_b256(&party_hash(&order.sender));
	enc.push_b256(&party_hash(&order.affiliate));
	keccak256(enc.finish())
}

/// Final EIP-712 digest of `order` under `scope`.
///
/// The domain is `(name, version, chainId, verifyingContract)`. The deployed
/// Swap v2 contracts hash a domain without `chainId`, so these signatures do
/// not verify on-chain there; the digest is meant for verifiers that bind the
/// chain as well. The signature field is not part of the digest.
pub fn order_hash(order: &Order, scope: &SignatureScope) -> B256 {
	let domain_hash = compute_domain_hash(
		DOMAIN_NAME,
		DOMAIN_VERSION,
		scope.chain_id,
		&scope.verifying_contract,
	);
	compute_final_digest(&domain_hash, &order_struct_hash(order))
}
