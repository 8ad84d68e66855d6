//! Quote methods.
//!
//! `getSenderSideQuote` fixes the signer amount and prices the sender leg,
//! `getSignerSideQuote` does the reverse, and `getMaxQuote` offers the
//! configured maximum signer amount.

use super::{required_amount, RequestError, RequestKind};
use maker_pricing::QuoteEngine;
use maker_types::{Address, Quote, RequestParams};
use tracing::debug;

/// Prices the trade named by `kind`.
///
/// Order kinds are priced like their quote counterparts.
pub fn process_quote_request(
	kind: RequestKind,
	params: &RequestParams,
	signer_token: Address,
	sender_token: Address,
	engine: &QuoteEngine,
) -> Result<Quote, RequestError> {
	let quote = match kind {
		RequestKind::GetSenderSideQuote | RequestKind::GetSenderSideOrder => {
			let signer_amount = required_amount(params.signer_amount.as_ref(), "signerAmount")?;
			engine.quote_given_signer_amount(signer_token, signer_amount, sender_token)?
		},
		RequestKind::GetSignerSideQuote | RequestKind::GetSignerSideOrder => {
			let sender_amount = required_amount(params.sender_amount.as_ref(), "senderAmount")?;
			engine.quote_given_sender_amount(sender_token, sender_amount, signer_token)?
		},
		RequestKind::GetMaxQuote => engine.quote_at_maximum(signer_token, sender_token)?,
	};

	debug!(
		"{}: signer {} {} / sender {} {}",
		kind, quote.signer.amount, quote.signer.token, quote.sender.amount, quote.sender.token
	);
	Ok(quote)
}
