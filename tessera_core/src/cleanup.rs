// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred cleanup callbacks.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::isolate::run_isolated;

/// Outcome of [`CleanupStack::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Callbacks that ran.
    pub ran: usize,
    /// Callbacks that panicked (always 0 without the `std` feature).
    pub failed: usize,
}

/// Cleanup callbacks run in reverse registration order.
///
/// Each callback runs at most once. With the `std` feature a panicking
/// callback is counted and the rest still run.
#[derive(Default)]
pub struct CleanupStack {
    entries: Vec<Box<dyn FnOnce()>>,
}

impl core::fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CleanupStack")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl CleanupStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a callback.
    pub fn push(&mut self, f: impl FnOnce() + 'static) {
        self.entries.push(Box::new(f));
    }

    /// Returns the number of pending callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no callbacks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs and removes every callback, newest first.
    pub fn run(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        while let Some(f) = self.entries.pop() {
            report.ran += 1;
            if !run_isolated(f) {
                report.failed += 1;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn runs_in_reverse_order_once() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut stack = CleanupStack::new();
        for i in 0..3 {
            let order = order.clone();
            stack.push(move || order.borrow_mut().push(i));
        }
        assert_eq!(stack.len(), 3);
        let report = stack.run();
        assert_eq!(report, TeardownReport { ran: 3, failed: 0 });
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert!(stack.is_empty());
        assert_eq!(stack.run().ran, 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn failing_cleanup_does_not_stop_the_rest() {
        let ran = Rc::new(RefCell::new(false));
        let r = ran.clone();
        let mut stack = CleanupStack::new();
        stack.push(move || *r.borrow_mut() = true);
        stack.push(|| panic!("cleanup failed"));
        let report = stack.run();
        assert_eq!(report, TeardownReport { ran: 2, failed: 1 });
        assert!(*ran.borrow());
    }
}
