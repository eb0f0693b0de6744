// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unwind boundaries around user callbacks.
//!
//! With the `std` feature each callback runs under
//! [`catch_unwind`](std::panic::catch_unwind), so one panicking listener or
//! cleanup does not stop the rest. Without `std` there is no unwind boundary
//! and panics propagate.

/// Runs `f`, returning `false` if it panicked.
#[cfg(feature = "std")]
pub(crate) fn run_isolated(f: impl FnOnce()) -> bool {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).is_ok()
}

/// Runs `f`. Always returns `true`: panics propagate without `std`.
#[cfg(not(feature = "std"))]
pub(crate) fn run_isolated(f: impl FnOnce()) -> bool {
    f();
    true
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn completed_callback_reports_success() {
        let ran = Cell::new(false);
        assert!(run_isolated(|| ran.set(true)));
        assert!(ran.get());
    }

    #[cfg(feature = "std")]
    #[test]
    fn panicking_callback_is_contained() {
        assert!(!run_isolated(|| panic!("listener failed")));
    }

    #[cfg(not(feature = "std"))]
    #[test]
    #[should_panic(expected = "listener failed")]
    fn panicking_callback_propagates_without_std() {
        run_isolated(|| panic!("listener failed"));
    }
}
