//! Stack growth guard.
//!
//! Statement text is arbitrary user input, so both the recursive-descent
//! parser and the tree-walking interpreter can be driven arbitrarily deep
//! (`((((1))))`, `[[[[...]]]]`, recursive functions). Every recursive entry
//! point runs its body through [`with_stack`], which switches to a fresh
//! segment when the remaining stack drops below [`MIN_REMAINING`].
//!
//! On `wasm32` the guard is a plain call.

/// Grow when fewer than this many bytes of stack remain.
pub const MIN_REMAINING: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_REMAINING, SEGMENT_SIZE, f)
}

/// Run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Nested {
        Leaf,
        Wrap(Box<Nested>),
    }

    fn depth(n: &Nested) -> usize {
        with_stack(|| match n {
            Nested::Leaf => 0,
            Nested::Wrap(inner) => depth(inner) + 1,
        })
    }

    #[test]
    fn measures_deeply_nested_tree() {
        let mut tree = Nested::Leaf;
        for _ in 0..200_000 {
            tree = Nested::Wrap(Box::new(tree));
        }
        assert_eq!(depth(&tree), 200_000);

        // Drop iteratively so the test does not overflow on teardown.
        let mut cur = tree;
        while let Nested::Wrap(inner) = cur {
            cur = *inner;
        }
    }

    #[test]
    fn passes_result_through() {
        let r: Result<u8, String> = with_stack(|| Ok(7));
        assert_eq!(r, Ok(7));
    }
}
