//! Stack growth for recursive analysis.
//!
//! Subsumption tests, joins and the tree walk all recurse on the shape of
//! user data, so a deeply nested literal must not overflow the native stack.
//! Wrap each recursive step in [`ensure_sufficient_stack`]; on native targets
//! a fresh segment is allocated once less than [`RED_ZONE`] bytes remain.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each additional segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
