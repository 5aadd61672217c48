//! Stack safety for the recursive parser and evaluator.
//!
//! Deeply nested source (e.g. `-(-(-(...)))` or a long chain of nested calls)
//! recurses once per level in both the parser and the evaluator. Wrapping the
//! recursive entry points in [`ensure_sufficient_stack`] grows the native
//! stack on demand instead of overflowing it.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate each time the red zone is hit (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
