//! Context threaded through subsumption and matching.

use crate::external::{DefaultMatcher, LocatorMatcher};

/// Nesting bound for `test`/`test_value`. Exceeding it means the lattice
/// contains a runaway cyclic shape, which is a defect, not a user error.
pub const MAX_TEST_DEPTH: u32 = 512;

static DEFAULT_MATCHER: DefaultMatcher = DefaultMatcher;

/// Depth counter plus the runtime's locator matching rules.
#[derive(Copy, Clone)]
pub struct TestCx<'m> {
    depth: u32,
    matcher: &'m dyn LocatorMatcher,
}

impl<'m> TestCx<'m> {
    pub fn new(matcher: &'m dyn LocatorMatcher) -> Self {
        TestCx { depth: 0, matcher }
    }

    pub fn depth(self) -> u32 {
        self.depth
    }

    pub fn matcher(self) -> &'m dyn LocatorMatcher {
        self.matcher
    }

    /// Context for one nesting level down.
    ///
    /// # Panics
    /// Panics past [`MAX_TEST_DEPTH`].
    #[inline]
    #[must_use]
    pub fn deeper(self) -> Self {
        let depth = self.depth + 1;
        if depth > MAX_TEST_DEPTH {
            exceeded(depth);
        }
        TestCx { depth, ..self }
    }
}

impl TestCx<'static> {
    /// Context using [`DefaultMatcher`], for callers with no runtime attached.
    pub fn detached() -> Self {
        TestCx::new(&DEFAULT_MATCHER)
    }
}

impl Default for TestCx<'static> {
    fn default() -> Self {
        Self::detached()
    }
}

#[cold]
#[inline(never)]
fn exceeded(depth: u32) -> ! {
    panic!("symbolic test recursion depth {depth} exceeds {MAX_TEST_DEPTH}: cyclic shape?")
}

impl std::fmt::Debug for TestCx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCx").field("depth", &self.depth).finish_non_exhaustive()
    }
}
