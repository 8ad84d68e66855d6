//! Registry trait for self-registering implementations.
//!
//! Pluggable components (currently the signing account) expose a `Registry`
//! type naming the configuration key they answer to and the factory that
//! builds them from their TOML section.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The key used under `implementations` in the configuration, for
	/// example `"local"` for `[account.implementations.local]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds this implementation from its config.
	fn factory() -> Self::Factory;
}
