//! Stack safety for the recursive passes.
//!
//! Both walkers recurse once per nesting level of the tree, and user code
//! recurses through calls. Every recursive visit is wrapped in
//! [`ensure_sufficient_stack`] so a deep tree grows the stack instead of
//! crashing the host process.
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.

/// Grow when less than this remains (128KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Stack reserved for deserializing one tree (64MB).
///
/// `serde` recursion cannot be instrumented from the outside, so the whole
/// deserialization runs on one large segment.
#[cfg(not(target_arch = "wasm32"))]
const DESERIALIZE_STACK: usize = 64 * 1024 * 1024;

/// Run `f` with at least the red zone of stack available.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Run `f` on a dedicated large stack segment.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn with_deserialize_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::grow(DESERIALIZE_STACK, f)
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn with_deserialize_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(200_000), 200_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("nope"));
        assert_eq!(result, Err("nope"));
    }
}
