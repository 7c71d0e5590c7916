//! Stack growth for the recursive passes.
//!
//! The parser, resolver and interpreter all recurse once per level of
//! nesting in the source, so a deeply nested program or a deep recursion in
//! user code can exhaust a small thread stack long before the call-depth
//! limit is reached. Each recursive entry point goes through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the current one runs low.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
