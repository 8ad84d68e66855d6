//! Signs orders with the maker's account and verifies signed orders.

use crate::{AccountError, AccountService};
use alloy_primitives::PrimitiveSignature;
use maker_order::order_hash;
use maker_types::{
	Address, Order, Signature, SignatureScope, SIGNATURE_VERSION_TYPED_DATA,
};
use std::sync::Arc;
use tracing::debug;

/// Attaches typed-data signatures to orders for one signature scope.
pub struct OrderSigner {
	account: Arc<AccountService>,
	address: Address,
	scope: SignatureScope,
}

impl OrderSigner {
	/// Resolves the account address once so it can be used as the signer
	/// wallet without another round trip.
	pub async fn new(account: Arc<AccountService>, scope: SignatureScope) -> Result<Self, AccountError> {
		let address = account.get_address().await?;
		Ok(Self {
			account,
			address,
			scope,
		})
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn scope(&self) -> &SignatureScope {
		&self.scope
	}

	/// Signs `order` under this signer's scope.
	pub async fn sign(&self, order: Order) -> Result<Order, AccountError> {
		self.sign_for(order, &self.scope).await
	}

	/// Signs `order` under an explicit scope.
	pub async fn sign_for(&self, mut order: Order, scope: &SignatureScope) -> Result<Order, AccountError> {
		if order.is_signed() {
			return Err(AccountError::SigningFailed("order is already signed".to_string()));
		}
		if order.signer.wallet != self.address {
			return Err(AccountError::SigningFailed(format!(
				"order signer {} does not match account {}",
				order.signer.wallet, self.address
			)));
		}

		let digest = order_hash(&order, scope);
		let signature = self.account.sign_hash(&digest).await?;
		debug!("Signed order {} for {}", digest, scope);

		order.signature = Some(Signature {
			signatory: self.address,
			validator: scope.verifying_contract,
			version: SIGNATURE_VERSION_TYPED_DATA,
			v: signature.v,
			r: signature.r,
			s: signature.s,
		});
		Ok(order)
	}
}

/// Returns true when `order` carries a signature by its signer wallet that is
/// valid for `scope`.
pub fn verify_order(order: &Order, scope: &SignatureScope) -> bool {
	let Some(signature) = &order.signature else {
		return false;
	};
	if signature.validator != scope.verifying_contract
		|| signature.version != SIGNATURE_VERSION_TYPED_DATA
		|| signature.signatory != order.signer.wallet
	{
		return false;
	}

	let bytes = signature.to_rsv_bytes();
	let Ok(recoverable) = PrimitiveSignature::try_from(&bytes[..]) else {
		return false;
	};
	recoverable
		.recover_address_from_prehash(&order_hash(order, scope))
		.map(|recovered| recovered == signature.signatory)
		.unwrap_or(false)
}
