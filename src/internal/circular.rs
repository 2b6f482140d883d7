//! Thread-local resolution stack used for cycle and depth detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::Key;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Key>> = const { RefCell::new(Vec::new()) };
}

/// Marks a key as *Resolving* on the current thread for as long as it lives.
///
/// Entering a key that is already on the stack is a cycle. The stack is
/// per-thread because a resolution chain never hops threads: constructors run
/// on the thread that asked for them. Two threads meeting inside one cycle are
/// not visible here, which is why `build()` rejects declared cycles up front.
pub(crate) struct ResolutionGuard {
    key: Key,
}

impl ResolutionGuard {
    pub(crate) fn enter(key: Key, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.contains(&key) {
                let mut path = stack.clone();
                path.push(key);
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }

            stack.push(key);
            Ok(Self { key })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.key));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn reentry_reports_full_path() {
        let _a = ResolutionGuard::enter(Key::of::<A>(), 16).unwrap();
        let _b = ResolutionGuard::enter(Key::of::<B>(), 16).unwrap();
        match ResolutionGuard::enter(Key::of::<A>(), 16) {
            Err(DiError::Circular(path)) => {
                assert_eq!(path, vec![Key::of::<A>(), Key::of::<B>(), Key::of::<A>()]);
            }
            _ => panic!("expected cycle"),
        }
    }

    #[test]
    fn guard_pops_on_drop() {
        {
            let _a = ResolutionGuard::enter(Key::of::<A>(), 16).unwrap();
        }
        assert!(ResolutionGuard::enter(Key::of::<A>(), 16).is_ok());
    }

    #[test]
    fn depth_limit() {
        let _a = ResolutionGuard::enter(Key::of::<A>(), 1).unwrap();
        assert!(matches!(
            ResolutionGuard::enter(Key::of::<B>(), 1),
            Err(DiError::DepthExceeded(1))
        ));
    }
}
