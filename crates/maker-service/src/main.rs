//! Main entry point for the swap maker service.
//!
//! This binary quotes and signs token swap orders for a single maker account
//! over a JSON-RPC 2.0 HTTP endpoint. Pricing comes from a static pair table
//! and orders are signed for the settlement contract deployed on the
//! configured chain.

use clap::Parser;
use maker_account::{AccountService, OrderSigner};
use maker_config::Config;
use maker_order::OrderBuilder;
use maker_pricing::{PricingTable, QuoteEngine};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

use apis::router::RequestRouter;

/// Command-line arguments for the maker service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Chain to sign orders for, overriding `settlement.chain_id`
	#[arg(long, env = "MAKER_CHAIN_ID")]
	chain_id: Option<u64>,
}

/// Main entry point for the maker service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the pricing table, signer and request router
/// 5. Serves requests until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started maker");

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let mut config = Config::from_file(config_path).await?;
	if let Some(chain_id) = args.chain_id {
		config = config.with_chain_id(chain_id)?;
	}
	tracing::info!("Loaded configuration [{}]", config.maker.id);

	let router = Arc::new(build_router(&config).await?);

	server::start_server(config.api.clone(), router, shutdown_signal()).await?;

	tracing::info!("Stopped maker");
	Ok(())
}

/// Builds the request router from configuration.
///
/// Fails if the chain has no settlement deployment, the account key is
/// unusable or the pair table is invalid.
async fn build_router(config: &Config) -> Result<RequestRouter, Box<dyn std::error::Error>> {
	let scope = config.signature_scope()?;

	let table = PricingTable::from_config(config).await?;
	tracing::info!("Serving {} pairs", table.len());
	for (pair, rate) in table.pairs() {
		tracing::debug!("Pair {} at {}", pair, rate);
	}
	let engine = QuoteEngine::new(Arc::new(table), config.maker.max_signer_amount);

	let (implementation, account_config) = config.primary_account()?;
	let account = AccountService::from_config(implementation, account_config)?;
	let signer = OrderSigner::new(Arc::new(account), scope).await?;

	let router = RequestRouter::new(engine, OrderBuilder::new(), signer);
	tracing::info!(
		"Signing as {} for {}",
		maker_types::utils::short_address(&router.signer_address()),
		scope
	);
	Ok(router)
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!("Failed to listen for Ctrl-C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!("Failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
	use super::*;
	use maker_config::builders::ConfigBuilder;
	use maker_types::{Address, U256};
	use rust_decimal::Decimal;

	fn token(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	#[tokio::test]
	async fn test_build_router_from_config() {
		let config = ConfigBuilder::new()
			.deployment(4, token(0x5a))
			.pair(token(0xa), token(0xb), Decimal::new(2, 0))
			.max_signer_amount(U256::from(1000))
			.build();

		let router = build_router(&config).await.unwrap();
		assert!(!router.is_signing_halted());

		let response = router
			.handle_body(
				serde_json::json!({
					"jsonrpc": "2.0",
					"id": 1,
					"method": "getMaxQuote",
					"params": {"signerToken": token(0xa), "senderToken": token(0xb)}
				})
				.to_string()
				.as_bytes(),
			)
			.await;
		let response = serde_json::to_value(response).unwrap();
		assert_eq!(response["result"]["sender"]["amount"], "2000");
	}

	#[tokio::test]
	async fn test_missing_deployment_is_fatal() {
		let mut config = ConfigBuilder::new()
			.pair(token(0xa), token(0xb), Decimal::new(2, 0))
			.build();
		config.settlement.chain_id = 1;

		let err = build_router(&config).await.err().unwrap();
		assert_eq!(err.to_string(), "Validation error: No Swap contract found for chain ID 1");
	}

	#[tokio::test]
	async fn test_bad_key_is_fatal() {
		let config = ConfigBuilder::new()
			.private_key("0x1234")
			.pair(token(0xa), token(0xb), Decimal::new(2, 0))
			.build();
		assert!(build_router(&config).await.is_err());
	}

	#[tokio::test]
	async fn test_loads_config_file_with_pairs_file() {
		let dir = tempfile::tempdir().unwrap();
		let pairs = serde_json::json!({
			token(0xa).to_string(): { token(0xb).to_string(): 0.5 }
		});
		std::fs::write(dir.path().join("pairs.json"), pairs.to_string()).unwrap();
		std::fs::write(
			dir.path().join("config.toml"),
			format!(
				r#"
[maker]
id = "file-maker"

[account]
primary = "local"
[account.implementations.local]
private_key = "{key}"

[settlement]
chain_id = 4
[settlement.deployments]
4 = "{contract}"

[pricing]
pairs_file = "pairs.json"
"#,
				key = maker_config::builders::TEST_PRIVATE_KEY,
				contract = token(0x5a),
			),
		)
		.unwrap();

		let path = dir.path().join("config.toml");
		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		let router = build_router(&config).await.unwrap();

		let response = router
			.handle_body(
				serde_json::json!({
					"jsonrpc": "2.0",
					"id": 1,
					"method": "getMaxQuote",
					"params": {"signerToken": token(0xa), "senderToken": token(0xb)}
				})
				.to_string()
				.as_bytes(),
			)
			.await;
		let response = serde_json::to_value(response).unwrap();
		assert_eq!(response["result"]["signer"]["amount"], "1000");
		assert_eq!(response["result"]["sender"]["amount"], "500");
	}
}
