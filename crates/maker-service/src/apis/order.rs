//! Order methods.
//!
//! Prices the trade, builds an order with the maker as signer wallet and the
//! requested sender wallet, then signs it.

use super::{parse_address, quote::process_quote_request, RequestError, RequestKind};
use maker_account::OrderSigner;
use maker_order::OrderBuilder;
use maker_pricing::QuoteEngine;
use maker_types::{Address, Order, RequestParams};
use tracing::info;

/// Everything needed to answer an order request.
pub struct OrderContext<'a> {
	pub engine: &'a QuoteEngine,
	pub builder: &'a OrderBuilder,
	pub signer: &'a OrderSigner,
}

/// Builds and signs the order named by `kind` at unix time `now`.
pub async fn process_order_request(
	kind: RequestKind,
	params: &RequestParams,
	signer_token: Address,
	sender_token: Address,
	context: &OrderContext<'_>,
	now: u64,
) -> Result<Order, RequestError> {
	let sender_wallet = parse_address(params.sender_wallet.as_deref()).ok_or_else(|| {
		RequestError::InvalidOrderParameters("senderWallet is missing or malformed".to_string())
	})?;

	let quote = process_quote_request(kind, params, signer_token, sender_token, context.engine)?;

	let order = context.builder.build(
		context.signer.address(),
		quote.signer.token,
		quote.signer.amount,
		sender_wallet,
		quote.sender.token,
		quote.sender.amount,
		now,
	)?;
	let order = context.signer.sign(order).await?;

	info!(
		"Signed {} order with nonce {} for {}",
		kind, order.nonce, sender_wallet
	);
	Ok(order)
}
