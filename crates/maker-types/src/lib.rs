//! Common types module for the swap maker.
//!
//! This module defines the data types shared by the pricing, order, account
//! and service crates: quotes, orders, signatures, the JSON-RPC envelope and
//! the configuration validation framework.

/// Quote, order and signature types exchanged with counterparties.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// JSON-RPC 2.0 request and response envelope types.
pub mod rpc;
/// Redacting string wrapper for private keys.
pub mod secret_string;
/// Utility functions for hashing, formatting and timestamps.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use alloy_primitives::{Address, B256, U256};
pub use order::*;
pub use registry::ImplementationRegistry;
pub use rpc::*;
pub use secret_string::SecretString;
pub use utils::{current_timestamp, without_0x_prefix};
pub use validation::*;
