//! Stack safety for deep expression trees.
//!
//! The interpreter is a direct recursive tree walk, so pathologically
//! nested input could exhaust the thread stack. Native targets grow the
//! stack on demand through `stacker`; WASM targets pass through (WASM
//! has its own stack management).

/// Minimum stack space to keep available before recursing.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing.
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first when the remaining space is inside
/// the red zone.
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Run `f` directly; WASM manages its own stack.
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
