//! Self-registration for pluggable implementations.

/// Implemented by a zero-sized marker per pluggable backend.
///
/// `NAME` is the key used in configuration tables and `factory` returns the
/// constructor for that backend. Each interface crate narrows `Factory` to
/// its own function type.
pub trait ImplementationRegistry {
	/// Name used to select the implementation in configuration.
	const NAME: &'static str;

	/// Constructor type produced by this registry.
	type Factory;

	/// Returns the constructor.
	fn factory() -> Self::Factory;
}
