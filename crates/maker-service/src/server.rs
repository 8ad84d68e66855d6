//! HTTP server for the maker JSON-RPC API.
//!
//! Takers post JSON-RPC 2.0 bodies to `/`. Browsers talk to the maker
//! directly, so CORS is open for `POST`.

use crate::apis::router::RequestRouter;
use axum::{
	body::Bytes,
	extract::{DefaultBodyLimit, State},
	http::Method,
	response::Json,
	routing::post,
	Router,
};
use maker_config::ApiConfig;
use maker_types::RpcResponse;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub router: Arc<RequestRouter>,
}

/// Builds the axum application.
pub fn build_app(api_config: &ApiConfig, router: Arc<RequestRouter>) -> Router {
	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::POST])
		.allow_headers(Any);

	Router::new()
		.route("/", post(handle_rpc))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors)
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(AppState { router })
}

/// Serves the API until `shutdown` resolves.
pub async fn start_server<F>(
	api_config: ApiConfig,
	router: Arc<RequestRouter>,
	shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
	F: Future<Output = ()> + Send + 'static,
{
	let app = build_app(&api_config, router);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Maker API server listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	tracing::info!("Maker API server stopped");
	Ok(())
}

/// Handles POST / requests.
///
/// The body is taken raw so that malformed JSON is answered with a JSON-RPC
/// parse error rather than an HTTP rejection.
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
	Json(state.router.handle_body(&body).await)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{header, Request, StatusCode},
	};
	use maker_account::{implementations::local::LocalAccount, AccountService, OrderSigner};
	use maker_order::OrderBuilder;
	use maker_pricing::{PricingTable, QuoteEngine};
	use maker_types::{error_codes, Address, SecretString, SignatureScope, TradingPair, U256};
	use rust_decimal::Decimal;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	async fn app() -> Router {
		let table = PricingTable::from_pairs([(
			TradingPair::new(Address::repeat_byte(0xa), Address::repeat_byte(0xb)),
			Decimal::new(2, 0),
		)])
		.unwrap();
		let engine = QuoteEngine::new(Arc::new(table), U256::from(1000));
		let account = LocalAccount::new(&SecretString::from(KEY)).unwrap();
		let scope = SignatureScope {
			verifying_contract: Address::repeat_byte(0x5a),
			chain_id: 4,
		};
		let signer = OrderSigner::new(Arc::new(AccountService::new(Box::new(account))), scope)
			.await
			.unwrap();
		let router = RequestRouter::new(engine, OrderBuilder::new(), signer);
		build_app(&ApiConfig::default(), Arc::new(router))
	}

	async fn post_body(app: Router, body: String) -> (StatusCode, Value) {
		let response = app
			.oneshot(
				Request::builder()
					.method(Method::POST)
					.uri("/")
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(body))
					.unwrap(),
			)
			.await
			.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[tokio::test]
	async fn test_quote_over_http() {
		let body = json!({
			"jsonrpc": "2.0",
			"id": "abc",
			"method": "getSenderSideQuote",
			"params": {
				"signerToken": Address::repeat_byte(0xa),
				"senderToken": Address::repeat_byte(0xb),
				"signerAmount": "10"
			}
		});
		let (status, response) = post_body(app().await, body.to_string()).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(response["id"], "abc");
		assert_eq!(response["result"]["sender"]["amount"], "20");
	}

	#[tokio::test]
	async fn test_errors_are_http_ok() {
		let (status, response) = post_body(app().await, "[1,".to_string()).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(response["error"]["code"], error_codes::PARSE_ERROR);

		let body = json!({
			"jsonrpc": "2.0",
			"id": 2,
			"method": "getMaxQuote",
			"params": {
				"signerToken": Address::repeat_byte(0xc),
				"senderToken": Address::repeat_byte(0xd)
			}
		});
		let (status, response) = post_body(app().await, body.to_string()).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(response["error"]["code"], error_codes::PAIR_NOT_SERVED);
	}

	#[tokio::test]
	async fn test_cors_preflight_allows_post() {
		let response = app()
			.await
			.oneshot(
				Request::builder()
					.method(Method::OPTIONS)
					.uri("/")
					.header(header::ORIGIN, "https://taker.example")
					.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		let headers = response.headers();
		assert_eq!(
			headers
				.get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
				.and_then(|v| v.to_str().ok()),
			Some("*")
		);
		assert!(headers
			.get(header::ACCESS_CONTROL_ALLOW_METHODS)
			.and_then(|v| v.to_str().ok())
			.is_some_and(|methods| methods.contains("POST")));
	}

	#[tokio::test]
	async fn test_get_not_routed() {
		let response = app()
			.await
			.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
	}
}
