//! Registry trait for self-registering implementations.
//!
//! Infrastructure crates (storage, auth, notify) expose pluggable backends
//! selected by name from the TOML configuration. Each backend module provides
//! a `Registry` struct implementing this trait so the service binary can wire
//! every available implementation into a factory map.

/// Base trait for implementation registries.
///
/// Each backend module must provide a Registry struct that implements this
/// trait, declaring its configuration name and factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example "memory" for `storage.implementations.memory` or
	/// "webhook" for `notify.implementations.webhook`.
	const NAME: &'static str;

	/// The factory function type this implementation provides. Each
	/// infrastructure crate defines its own factory signature.
	type Factory;

	/// Returns the factory function that can create instances of this
	/// implementation when provided with the appropriate configuration.
	fn factory() -> Self::Factory;
}
