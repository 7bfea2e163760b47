use std::cell::{Cell, RefCell};

use crate::Dispose;

/// An effect that re-runs when its key changes.
///
/// Before each new run the previous run's cleanup is executed, so at most one
/// cleanup is ever outstanding. Same-key runs are skipped entirely.
pub struct KeyedEffect<K> {
    last_key: RefCell<Option<K>>,
    cleanup: RefCell<Option<Dispose>>,
    generation: Cell<u64>,
}

impl<K: PartialEq + Clone + 'static> KeyedEffect<K> {
    pub fn new() -> Self {
        Self {
            last_key: RefCell::new(None),
            cleanup: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Runs `effect` if `key` differs from the last one seen.
    /// Returns whether the effect ran.
    pub fn run(&self, key: K, effect: impl FnOnce(&K) -> Dispose) -> bool {
        {
            let mut last = self.last_key.borrow_mut();
            if last.as_ref() == Some(&key) {
                return false;
            }
            *last = Some(key.clone());
        }
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let prev = self.cleanup.borrow_mut().take();
        if let Some(d) = prev {
            d.run();
        }

        let d = effect(&key);

        // A nested run from inside `effect` superseded this one.
        if self.generation.get() != generation {
            d.run();
            return true;
        }
        *self.cleanup.borrow_mut() = Some(d);
        true
    }

    /// True while the last run's cleanup has not executed yet.
    pub fn has_cleanup(&self) -> bool {
        self.cleanup
            .borrow()
            .as_ref()
            .is_some_and(|d| !d.is_spent())
    }

    pub fn last_key(&self) -> Option<K> {
        self.last_key.borrow().clone()
    }

    /// Runs the outstanding cleanup. The last key is kept, so a same-key run
    /// afterwards is still skipped.
    pub fn dispose(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        let prev = self.cleanup.borrow_mut().take();
        if let Some(d) = prev {
            d.run();
        }
    }
}

impl<K: PartialEq + Clone + 'static> Default for KeyedEffect<K> {
    fn default() -> Self {
        Self::new()
    }
}
