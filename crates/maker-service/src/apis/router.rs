//! JSON-RPC request routing.
//!
//! Every inbound body goes through `RequestRouter::handle_body`, which is the
//! only place internal errors are turned into wire error objects. Requests are
//! independent; the only shared mutable state is the one-way signing halt.

use super::{
	order::{process_order_request, OrderContext},
	parse_address,
	quote::process_quote_request,
	RequestError, RequestKind,
};
use maker_account::OrderSigner;
use maker_order::OrderBuilder;
use maker_pricing::QuoteEngine;
use maker_types::{
	current_timestamp, Address, RequestParams, RpcErrorObject, RpcRequest, RpcResponse,
	JSONRPC_VERSION,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Validates, dispatches and answers maker requests.
pub struct RequestRouter {
	engine: QuoteEngine,
	builder: OrderBuilder,
	signer: OrderSigner,
	/// Set once signing fails; order requests are refused from then on.
	signing_halted: AtomicBool,
}

impl RequestRouter {
	pub fn new(engine: QuoteEngine, builder: OrderBuilder, signer: OrderSigner) -> Self {
		Self {
			engine,
			builder,
			signer,
			signing_halted: AtomicBool::new(false),
		}
	}

	pub fn signer_address(&self) -> Address {
		self.signer.address()
	}

	pub fn is_signing_halted(&self) -> bool {
		self.signing_halted.load(Ordering::Acquire)
	}

	/// Answers a raw request body.
	pub async fn handle_body(&self, body: &[u8]) -> RpcResponse {
		match serde_json::from_slice::<Value>(body) {
			Ok(value) => self.handle_value(value).await,
			Err(e) => {
				warn!("Rejected unparseable request: {}", e);
				RpcResponse::failure(Value::Null, RpcErrorObject::parse_error())
			},
		}
	}

	/// Answers a parsed but not yet validated envelope.
	pub async fn handle_value(&self, value: Value) -> RpcResponse {
		let id = value.get("id").cloned().unwrap_or(Value::Null);

		let request = match serde_json::from_value::<RpcRequest>(value) {
			Ok(request) => request,
			Err(e) => {
				warn!("Rejected invalid request: {}", e);
				return RpcResponse::failure(id, RpcErrorObject::invalid_request());
			},
		};
		if request
			.jsonrpc
			.as_deref()
			.is_some_and(|version| version != JSONRPC_VERSION)
		{
			warn!("Rejected request with jsonrpc version {:?}", request.jsonrpc);
			return RpcResponse::failure(id, RpcErrorObject::invalid_request());
		}

		self.handle(request).await
	}

	pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
		info!("Received {} request", request.method);

		match self.route(&request).await {
			Ok(result) => RpcResponse::success(request.id, result),
			Err(err) => {
				match &err {
					RequestError::PairNotServed => {},
					RequestError::MethodNotFound(method) => {
						warn!("Unknown method {}", method)
					},
					other => warn!("{} request failed: {}", request.method, other),
				}
				RpcResponse::failure(request.id, err.to_rpc_error())
			},
		}
	}

	async fn route(&self, request: &RpcRequest) -> Result<Value, RequestError> {
		let params = parse_params(&request.params)?;
		let (signer_token, sender_token) = self.served_pair(&params)?;
		let kind = RequestKind::from_method(&request.method)
			.ok_or_else(|| RequestError::MethodNotFound(request.method.clone()))?;
		if kind.is_order() && self.is_signing_halted() {
			return Err(RequestError::Routing(
				"signing halted after an earlier failure".to_string(),
			));
		}

		self.dispatch(kind, &params, signer_token, sender_token)
			.await
	}

	/// Resolves the requested pair, failing unless it is in the table.
	fn served_pair(&self, params: &RequestParams) -> Result<(Address, Address), RequestError> {
		let signer_token = parse_address(params.signer_token.as_deref());
		let sender_token = parse_address(params.sender_token.as_deref());

		match (signer_token, sender_token) {
			(Some(signer_token), Some(sender_token))
				if self.engine.table().is_served(signer_token, sender_token) =>
			{
				Ok((signer_token, sender_token))
			},
			_ => {
				warn!(
					"Not serving quotes for {} -> {}",
					params.signer_token.as_deref().unwrap_or("<missing>"),
					params.sender_token.as_deref().unwrap_or("<missing>")
				);
				Err(RequestError::PairNotServed)
			},
		}
	}

	async fn dispatch(
		&self,
		kind: RequestKind,
		params: &RequestParams,
		signer_token: Address,
		sender_token: Address,
	) -> Result<Value, RequestError> {
		match kind {
			RequestKind::GetSenderSideQuote
			| RequestKind::GetSignerSideQuote
			| RequestKind::GetMaxQuote => {
				let quote =
					process_quote_request(kind, params, signer_token, sender_token, &self.engine)?;
				Ok(serde_json::to_value(quote)?)
			},
			RequestKind::GetSenderSideOrder | RequestKind::GetSignerSideOrder => {
				let context = OrderContext {
					engine: &self.engine,
					builder: &self.builder,
					signer: &self.signer,
				};
				let result = process_order_request(
					kind,
					params,
					signer_token,
					sender_token,
					&context,
					current_timestamp(),
				)
				.await;

				match result {
					Ok(order) => Ok(serde_json::to_value(order)?),
					Err(RequestError::Signing(e)) => {
						self.signing_halted.store(true, Ordering::Release);
						error!("Signing failed, refusing further order requests: {}", e);
						Err(RequestError::Signing(e))
					},
					Err(e) => Err(e),
				}
			},
		}
	}
}

/// Params may be omitted; anything other than an object is malformed.
fn parse_params(params: &Value) -> Result<RequestParams, RequestError> {
	match params {
		Value::Null => Ok(RequestParams::default()),
		Value::Object(map) => Ok(RequestParams::from_object(map)),
		other => Err(RequestError::Routing(format!(
			"params must be an object, got {}",
			other
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use maker_account::{
		implementations::local::LocalAccount, verify_order, AccountError, AccountInterface,
		AccountService, HashSignature,
	};
	use maker_pricing::PricingTable;
	use maker_types::{
		error_codes, Order, SecretString, SignatureScope, TradingPair, B256,
		PAIR_NOT_SERVED_MESSAGE, U256,
	};
	use rust_decimal::Decimal;
	use serde_json::json;
	use std::str::FromStr;
	use std::sync::atomic::AtomicUsize;
	use std::sync::Arc;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn token(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	fn scope() -> SignatureScope {
		SignatureScope {
			verifying_contract: token(0x5a),
			chain_id: 4,
		}
	}

	async fn router_with(account: Box<dyn AccountInterface>, rate: &str, max: u64) -> RequestRouter {
		let table = PricingTable::from_pairs([(
			TradingPair::new(token(0xa), token(0xb)),
			Decimal::from_str(rate).unwrap(),
		)])
		.unwrap();
		let engine = QuoteEngine::new(Arc::new(table), U256::from(max));
		let signer = OrderSigner::new(Arc::new(AccountService::new(account)), scope())
			.await
			.unwrap();
		RequestRouter::new(engine, OrderBuilder::new(), signer)
	}

	async fn router() -> RequestRouter {
		let account = LocalAccount::new(&SecretString::from(KEY)).unwrap();
		router_with(Box::new(account), "2.0", 1000).await
	}

	async fn call(router: &RequestRouter, body: Value) -> Value {
		let response = router.handle_body(body.to_string().as_bytes()).await;
		serde_json::to_value(response).unwrap()
	}

	fn request(method: &str, params: Value) -> Value {
		json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params})
	}

	struct FailingAccount {
		attempts: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl AccountInterface for FailingAccount {
		async fn address(&self) -> Result<Address, AccountError> {
			Ok(token(0x11))
		}

		async fn sign_hash(&self, _hash: &B256) -> Result<HashSignature, AccountError> {
			self.attempts.fetch_add(1, Ordering::SeqCst);
			Err(AccountError::SigningFailed("hardware wallet unplugged".to_string()))
		}
	}

	#[tokio::test]
	async fn test_sender_side_quote() {
		let router = router().await;
		let response = call(
			&router,
			request(
				"getSenderSideQuote",
				json!({"signerToken": token(0xa), "senderToken": token(0xb), "signerAmount": "10"}),
			),
		)
		.await;

		assert_eq!(response["id"], 1);
		assert_eq!(response["result"]["signer"]["amount"], "10");
		assert_eq!(response["result"]["sender"]["amount"], "20");
		assert!(response.get("error").is_none());
	}

	#[tokio::test]
	async fn test_legacy_param_names() {
		let router = router().await;
		let response = call(
			&router,
			request(
				"getSignerSideQuote",
				json!({"signerToken": token(0xa), "senderToken": token(0xb), "senderParam": 20}),
			),
		)
		.await;
		assert_eq!(response["result"]["signer"]["amount"], "10");
	}

	#[tokio::test]
	async fn test_max_quote() {
		let account = LocalAccount::new(&SecretString::from(KEY)).unwrap();
		let router = router_with(Box::new(account), "0.5", 1000).await;
		let response = call(
			&router,
			request(
				"getMaxQuote",
				json!({"signerToken": token(0xa), "senderToken": token(0xb), "signerAmount": "3"}),
			),
		)
		.await;
		assert_eq!(response["result"]["signer"]["amount"], "1000");
		assert_eq!(response["result"]["sender"]["amount"], "500");
	}

	#[tokio::test]
	async fn test_unserved_pair() {
		let router = router().await;
		for params in [
			json!({"signerToken": token(0xc), "senderToken": token(0xd), "signerAmount": "1"}),
			json!({"signerToken": token(0xb), "senderToken": token(0xa), "signerAmount": "1"}),
			json!({"signerToken": "not-an-address", "senderToken": token(0xb)}),
			json!({"senderToken": token(0xb)}),
		] {
			let response = call(&router, request("getSenderSideQuote", params)).await;
			assert_eq!(response["error"]["code"], error_codes::PAIR_NOT_SERVED);
			assert_eq!(response["error"]["message"], PAIR_NOT_SERVED_MESSAGE);
			assert!(response.get("result").is_none());
		}
	}

	#[tokio::test]
	async fn test_mistyped_tokens_are_not_served() {
		let router = router().await;
		for params in [
			json!({"signerToken": 123, "senderToken": 456, "signerAmount": "1"}),
			json!({"signerToken": token(0xa), "senderToken": {"address": token(0xb)}, "signerAmount": "1"}),
		] {
			let response = call(&router, request("getSenderSideQuote", params)).await;
			assert_eq!(response["error"]["code"], error_codes::PAIR_NOT_SERVED);
			assert_eq!(response["error"]["message"], PAIR_NOT_SERVED_MESSAGE);
		}
	}

	#[tokio::test]
	async fn test_quote_ignores_mistyped_wallet() {
		let router = router().await;
		let params = json!({
			"signerToken": token(0xa),
			"senderToken": token(0xb),
			"signerAmount": "10",
			"senderWallet": 5,
		});

		let quote = call(&router, request("getSenderSideQuote", params.clone())).await;
		assert_eq!(quote["result"]["sender"]["amount"], "20");

		let order = call(&router, request("getSenderSideOrder", params)).await;
		assert_eq!(order["error"]["code"], error_codes::INTERNAL_ERROR);
	}

	#[tokio::test]
	async fn test_pair_checked_before_method() {
		let router = router().await;
		let unserved = call(
			&router,
			request("getEverything", json!({"signerToken": token(0xc), "senderToken": token(0xd)})),
		)
		.await;
		assert_eq!(unserved["error"]["code"], error_codes::PAIR_NOT_SERVED);

		let served = call(
			&router,
			request("getEverything", json!({"signerToken": token(0xa), "senderToken": token(0xb)})),
		)
		.await;
		assert_eq!(served["error"]["code"], error_codes::METHOD_NOT_FOUND);
		assert_eq!(served["error"]["message"], "Method not found");
	}

	#[tokio::test]
	async fn test_envelope_errors() {
		let router = router().await;

		let response = serde_json::to_value(router.handle_body(b"{not json").await).unwrap();
		assert_eq!(response["error"]["code"], error_codes::PARSE_ERROR);
		assert_eq!(response["id"], Value::Null);

		let response = call(&router, json!({"jsonrpc": "2.0", "id": 7})).await;
		assert_eq!(response["error"]["code"], error_codes::INVALID_REQUEST);
		assert_eq!(response["id"], 7);

		let response = call(&router, json!({"jsonrpc": "1.0", "id": 7, "method": "getMaxQuote"})).await;
		assert_eq!(response["error"]["code"], error_codes::INVALID_REQUEST);
	}

	#[tokio::test]
	async fn test_internal_failures_are_generic() {
		let router = router().await;

		let missing_amount = call(
			&router,
			request("getSenderSideQuote", json!({"signerToken": token(0xa), "senderToken": token(0xb)})),
		)
		.await;
		let array_params = call(&router, request("getMaxQuote", json!([token(0xa), token(0xb)]))).await;
		let missing_wallet = call(
			&router,
			request(
				"getSenderSideOrder",
				json!({"signerToken": token(0xa), "senderToken": token(0xb), "signerAmount": "1"}),
			),
		)
		.await;

		for response in [missing_amount, array_params, missing_wallet] {
			assert_eq!(response["error"]["code"], error_codes::INTERNAL_ERROR);
			assert_eq!(response["error"]["message"], "Internal error");
		}
	}

	#[tokio::test]
	async fn test_sender_side_order() {
		let router = router().await;
		let before = current_timestamp();
		let response = call(
			&router,
			request(
				"getSenderSideOrder",
				json!({
					"signerToken": token(0xa),
					"senderToken": token(0xb),
					"signerAmount": "10",
					"senderWallet": token(0xc),
				}),
			),
		)
		.await;

		let order: Order = serde_json::from_value(response["result"].clone()).unwrap();
		assert_eq!(order.signer.wallet, router.signer_address());
		assert_eq!(order.sender.wallet, token(0xc));
		assert_eq!(order.sender.amount, U256::from(20));
		assert!(order.expiry >= before + 180 && order.expiry <= current_timestamp() + 180);
		assert!(verify_order(&order, &scope()));
	}

	#[tokio::test]
	async fn test_signing_failure_halts_orders_only() {
		let attempts = Arc::new(AtomicUsize::new(0));
		let account = FailingAccount {
			attempts: Arc::clone(&attempts),
		};
		let router = router_with(Box::new(account), "2.0", 1000).await;
		let order_request = request(
			"getSignerSideOrder",
			json!({
				"signerToken": token(0xa),
				"senderToken": token(0xb),
				"senderAmount": "20",
				"senderWallet": token(0xc),
			}),
		);

		let first = call(&router, order_request.clone()).await;
		assert_eq!(first["error"]["code"], error_codes::INTERNAL_ERROR);
		assert_eq!(first["error"]["message"], "Internal error");
		assert!(router.is_signing_halted());

		let second = call(&router, order_request).await;
		assert_eq!(second["error"]["code"], error_codes::INTERNAL_ERROR);
		assert_eq!(attempts.load(Ordering::SeqCst), 1);

		let quote = call(
			&router,
			request("getMaxQuote", json!({"signerToken": token(0xa), "senderToken": token(0xb)})),
		)
		.await;
		assert_eq!(quote["result"]["signer"]["amount"], "1000");
	}
}
