//! Stack growth for deeply nested templates.
//!
//! The expression parser, tree builder, normalizer and encoder all recurse
//! once per nesting level (`(a (b (c ...)))`, nested blocks, nested
//! elements). Each recursion point is wrapped in [`ensure_sufficient_stack`]
//! so pathological input grows the stack instead of overflowing it.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Nested {
        Leaf,
        Wrap(Box<Nested>),
    }

    fn depth(node: &Nested) -> usize {
        ensure_sufficient_stack(|| match node {
            Nested::Leaf => 0,
            Nested::Wrap(inner) => depth(inner) + 1,
        })
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("nope"));
        assert_eq!(result, Err("nope"));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut node = Nested::Leaf;
        for _ in 0..50_000 {
            node = Nested::Wrap(Box::new(node));
        }
        assert_eq!(depth(&node), 50_000);
        // Drop iteratively; the derived drop would recurse.
        while let Nested::Wrap(inner) = node {
            node = *inner;
        }
    }
}
