// ABOUTME: Sealed trait pattern for runtime traits.
// ABOUTME: Only the bollard runtime and the in-memory fake may implement them.

/// Sealed trait to prevent external implementations.
///
/// New methods can be added to the capability traits without breaking
/// downstream code, since only types inside this crate implement `Sealed`.
pub trait Sealed {}
