//! Hex prefix and log formatting helpers.

use alloy_primitives::Address;

/// Removes a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Shortens an address for log lines, e.g. `0x5fbd..0aa3`.
pub fn short_address(address: &Address) -> String {
	let full = format!("{:x}", address);
	let hex = without_0x_prefix(&full);
	format!("0x{}..{}", &hex[..4], &hex[hex.len() - 4..])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_strip_prefix() {
		assert_eq!(without_0x_prefix("0xabcd"), "abcd");
		assert_eq!(without_0x_prefix("0Xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}

	#[test]
	fn test_short_address() {
		let address: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
			.parse()
			.unwrap();
		assert_eq!(short_address(&address), "0x5fbd..0aa3");
	}
}
