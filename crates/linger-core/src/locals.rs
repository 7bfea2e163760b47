//! # Composition locals
//!
//! Thread‑local values that a subtree of composition can override without
//! threading them through every call. linger keeps one: the default exit
//! delay used by [`use_exit_transition`](crate::use_exit_transition).
//!
//! ```rust
//! use linger_core::*;
//! use std::time::Duration;
//!
//! with_exit_delay(ExitDelay(Duration::from_millis(120)), || {
//!     assert_eq!(exit_delay().0, Duration::from_millis(120));
//! });
//! assert_eq!(exit_delay().0, DEFAULT_EXIT_DELAY);
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

use web_time::Duration;

use crate::config::DEFAULT_EXIT_DELAY;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = const { RefCell::new(Vec::new()) };
}

/// How long exit transitions in this subtree take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitDelay(pub Duration);

impl Default for ExitDelay {
    fn default() -> Self {
        Self(DEFAULT_EXIT_DELAY)
    }
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local<T: 'static>(v: T) {
    LOCALS_STACK.with(|st| {
        let mut st = st.borrow_mut();
        if let Some(top) = st.last_mut() {
            top.insert(TypeId::of::<T>(), Box::new(v));
        } else {
            let mut m: HashMap<TypeId, Box<dyn Any>> = HashMap::new();
            m.insert(TypeId::of::<T>(), Box::new(v));
            st.push(m);
        }
    });
}

fn local<T: Copy + Default + 'static>() -> T {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return *t;
            }
        }
        T::default()
    })
}

pub fn with_exit_delay<R>(delay: ExitDelay, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local(delay);
        f()
    })
}

pub fn exit_delay() -> ExitDelay {
    local::<ExitDelay>()
}
