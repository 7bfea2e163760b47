use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::scope::with_current_inner;

/// Slot-based remember (sequential composition only).
///
/// Values live in the current [`Scope`](crate::Scope) and are dropped when it
/// is disposed. Outside of a scope nothing is remembered: `init` runs every
/// call.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let found = with_current_inner(|scope| {
        let cursor = scope.cursor.get();
        scope.cursor.set(cursor + 1);
        let slots = scope.slots.borrow();
        let existing = slots.get(cursor).map(|slot| slot.downcast_ref::<Rc<T>>().cloned());
        (cursor, existing)
    });

    let Some((cursor, existing)) = found else {
        log::warn!("remember called outside of a scope; value will not be retained");
        return Rc::new(init());
    };

    match existing {
        Some(Some(rc)) => rc,
        existing => {
            if existing.is_some() {
                log::warn!(
                    "remember: slot {} type changed; replacing. \
                     If this is due to conditional composition, prefer remember_with_key.",
                    cursor
                );
            }
            // `init` may itself remember or register disposers, so no borrow is
            // held while it runs.
            let rc: Rc<T> = Rc::new(init());
            store_slot(cursor, Box::new(rc.clone()));
            rc
        }
    }
}

fn store_slot(cursor: usize, value: Box<dyn Any>) {
    with_current_inner(|scope| {
        let mut slots = scope.slots.borrow_mut();
        if cursor < slots.len() {
            slots[cursor] = value;
        } else {
            // Nested remembers inside `init` claimed later cursors first.
            while slots.len() < cursor {
                slots.push(Box::new(()));
            }
            slots.push(value);
        }
    });
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let found = with_current_inner(|scope| {
        scope
            .keyed_slots
            .borrow()
            .get(&key)
            .map(|existing| existing.downcast_ref::<Rc<T>>().cloned())
    });

    let Some(existing) = found else {
        log::warn!("remember_with_key('{key}') called outside of a scope; value will not be retained");
        return Rc::new(init());
    };

    match existing {
        Some(Some(rc)) => rc,
        existing => {
            if existing.is_some() {
                log::warn!(
                    "remember_with_key: key '{}' reused with a different type; replacing.",
                    key
                );
            }
            let rc: Rc<T> = Rc::new(init());
            with_current_inner(|scope| {
                scope
                    .keyed_slots
                    .borrow_mut()
                    .insert(key, Box::new(rc.clone()));
            });
            rc
        }
    }
}

/// Drops the value stored under `key` in the current scope, so the next
/// `remember_with_key` call with that key re-initialises it.
pub fn forget_key(key: &str) -> bool {
    let removed = with_current_inner(|scope| scope.keyed_slots.borrow_mut().remove(key));
    matches!(removed, Some(Some(_)))
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}
