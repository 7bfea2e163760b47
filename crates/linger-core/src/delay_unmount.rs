//! # Delayed unmount
//!
//! Keeps an element "mounted" for a while after it was asked to hide, so an
//! exit transition has time to play before the element leaves the tree.
//!
//! Two flags are involved:
//!
//! - *requested*: what the caller wants (show or hide). The only input.
//! - *mounted*: whether the element should be in the render output.
//!
//! Whenever *requested* changes, one rule is evaluated:
//!
//! | mounted | requested | action                                   |
//! |---------|-----------|------------------------------------------|
//! | false   | true      | mount now                                |
//! | true    | false     | unmount once the delay has elapsed       |
//! | same    | same      | nothing                                  |
//!
//! Every evaluation first cancels the timer armed by the previous one, and
//! teardown cancels it too, so at most one unmount is ever pending.
//!
//! ```rust
//! use linger_core::*;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! set_clock(clock.clone());
//!
//! let overlay = DelayUnmount::new(Duration::from_millis(300), false, false);
//! overlay.show();
//! assert!(overlay.is_mounted());
//!
//! overlay.hide();
//! clock.advance(Duration::from_millis(299));
//! run_due_timers();
//! assert!(overlay.is_mounted());
//!
//! clock.advance(Duration::from_millis(1));
//! run_due_timers();
//! assert!(!overlay.is_mounted());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use web_time::Duration;

use crate::config::DelayUnmountConfig;
use crate::effects_ext::KeyedEffect;
use crate::locals::exit_delay;
use crate::timer::{self, TimerHandle};
use crate::{Dispose, Signal, on_unmount, remember, remember_with_key, scope};

/// Mounted/requested state pair with a deferred unmount.
///
/// Cheap to clone; clones share state. Teardown happens on [`dispose`] or when
/// the last clone is dropped.
///
/// [`dispose`]: DelayUnmount::dispose
#[derive(Clone)]
pub struct DelayUnmount {
    inner: Rc<Inner>,
}

struct Inner {
    delay: Duration,
    mounted: Signal<bool>,
    requested: Signal<bool>,
    transition: KeyedEffect<bool>,
    pending: Cell<Option<TimerHandle>>,
    disposed: Cell<bool>,
    mounted_listeners: RefCell<Vec<Rc<dyn Fn(bool)>>>,
}

/// The setter half of the pair: requests showing or hiding.
///
/// Holds the state weakly; calls after teardown are ignored.
#[derive(Clone)]
pub struct VisibilitySetter {
    inner: Weak<Inner>,
}

impl DelayUnmount {
    pub fn new(delay: Duration, initially_mounted: bool, initially_requested: bool) -> Self {
        let inner = Rc::new(Inner {
            delay,
            mounted: Signal::new(initially_mounted),
            requested: Signal::new(initially_requested),
            transition: KeyedEffect::new(),
            pending: Cell::new(None),
            disposed: Cell::new(false),
            mounted_listeners: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&inner);
        inner.requested.subscribe(move |&requested| {
            if let Some(inner) = weak.upgrade() {
                Inner::evaluate(&inner, requested);
            }
        });

        // Like an effect after first mount: the rule sees the initial values too.
        Inner::evaluate(&inner, initially_requested);

        Self { inner }
    }

    pub fn from_millis(millis: u64, initially_mounted: bool, initially_requested: bool) -> Self {
        Self::new(
            Duration::from_millis(millis),
            initially_mounted,
            initially_requested,
        )
    }

    pub fn with_config(config: DelayUnmountConfig) -> Self {
        Self::new(
            config.delay,
            config.initially_mounted,
            config.initially_requested,
        )
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.get()
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// True while an unmount is scheduled but has not happened yet.
    pub fn has_pending_unmount(&self) -> bool {
        self.inner.pending.get().is_some_and(|h| h.is_pending())
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Sets the requested visibility. Setting the current value again is a no-op.
    pub fn request(&self, next: bool) {
        Inner::request(&self.inner, next);
    }

    pub fn show(&self) {
        self.request(true);
    }

    pub fn hide(&self) {
        self.request(false);
    }

    pub fn toggle(&self) {
        self.request(!self.is_requested());
    }

    pub fn setter(&self) -> VisibilitySetter {
        VisibilitySetter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// `(mounted, request_visibility)`, the pair a component renders from.
    pub fn split(&self) -> (bool, VisibilitySetter) {
        (self.is_mounted(), self.setter())
    }

    /// Read-only view of the mounted flag. Writes through this handle bypass
    /// the transition rule, so hosts should only `get` and `subscribe`.
    pub fn mounted_signal(&self) -> Signal<bool> {
        self.inner.mounted.clone()
    }

    /// Calls `f` with the new value whenever the mounted flag flips.
    pub fn on_mounted_change(&self, f: impl Fn(bool) + 'static) {
        self.inner.mounted_listeners.borrow_mut().push(Rc::new(f));
    }

    /// Tears the state down: cancels any pending unmount and ignores further
    /// requests. Safe to call more than once.
    pub fn dispose(&self) {
        self.inner.teardown();
    }
}

impl std::fmt::Debug for DelayUnmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayUnmount")
            .field("delay", &self.inner.delay)
            .field("mounted", &self.is_mounted())
            .field("requested", &self.is_requested())
            .field("pending_unmount", &self.has_pending_unmount())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl VisibilitySetter {
    pub fn set(&self, next: bool) {
        match self.inner.upgrade() {
            Some(inner) => Inner::request(&inner, next),
            None => log::trace!("visibility request after teardown ignored"),
        }
    }

    /// False once the owning state has been dropped or disposed.
    pub fn is_live(&self) -> bool {
        self.inner.upgrade().is_some_and(|i| !i.disposed.get())
    }
}

impl Inner {
    fn request(this: &Rc<Inner>, next: bool) {
        if this.disposed.get() {
            log::trace!("visibility request after teardown ignored");
            return;
        }
        // Only a change notifies the subscriber installed in `new`.
        this.requested.set_if_changed(next);
    }

    fn evaluate(this: &Rc<Inner>, requested: bool) {
        if this.disposed.get() {
            return;
        }
        this.transition.run(requested, |&requested| {
            let mounted = this.mounted.get();
            if !mounted && requested {
                log::debug!("mounting");
                this.set_mounted(true);
                Dispose::noop()
            } else if mounted && !requested {
                log::debug!("unmount scheduled in {:?}", this.delay);
                let weak = Rc::downgrade(this);
                let handle = timer::set_timeout(this.delay, move || {
                    if let Some(inner) = weak.upgrade()
                        && !inner.disposed.get()
                    {
                        log::debug!("unmounting");
                        inner.pending.set(None);
                        inner.set_mounted(false);
                    }
                });
                this.pending.set(Some(handle));
                let weak = Rc::downgrade(this);
                on_unmount(move || {
                    handle.cancel();
                    if let Some(inner) = weak.upgrade()
                        && inner.pending.get() == Some(handle)
                    {
                        inner.pending.set(None);
                    }
                })
            } else {
                Dispose::noop()
            }
        });
    }

    fn set_mounted(&self, mounted: bool) {
        if !self.mounted.set_if_changed(mounted) {
            return;
        }
        // Snapshot, so a listener may request again (or register another)
        // and the nested flip still reaches every listener.
        let listeners: Vec<Rc<dyn Fn(bool)>> = self.mounted_listeners.borrow().clone();
        for l in listeners {
            l(mounted);
        }
    }

    fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }
        log::trace!("delay-unmount torn down");
        self.transition.dispose();
        if let Some(h) = self.pending.take() {
            h.cancel();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Delayed-unmount state remembered in the current scope.
///
/// Created on the first composition with the given arguments; later
/// compositions return the same state and ignore the arguments. The state is
/// torn down with the scope, and a mounted-flag change invalidates the scope
/// so the host knows to compose it again.
pub fn use_delay_unmount(
    delay: Duration,
    initially_mounted: bool,
    initially_requested: bool,
) -> (bool, VisibilitySetter) {
    let state = remember(|| {
        bind_to_scope(DelayUnmount::new(
            delay,
            initially_mounted,
            initially_requested,
        ))
    });
    state.split()
}

/// Key-based variant of [`use_delay_unmount`], stable across conditional
/// branches.
pub fn use_delay_unmount_with_key(
    key: impl Into<String>,
    config: DelayUnmountConfig,
) -> (bool, VisibilitySetter) {
    let key = key.into();
    let state = remember_with_key(format!("delay_unmount:{key}"), || {
        bind_to_scope(DelayUnmount::with_config(config))
    });
    state.split()
}

/// [`use_delay_unmount`] with the delay taken from the
/// [`exit_delay`](crate::exit_delay) composition local.
pub fn use_exit_transition(
    initially_mounted: bool,
    initially_requested: bool,
) -> (bool, VisibilitySetter) {
    use_delay_unmount(exit_delay().0, initially_mounted, initially_requested)
}

fn bind_to_scope(state: DelayUnmount) -> DelayUnmount {
    if let Some(scope) = scope::current_scope() {
        let owner = scope.downgrade();
        state.on_mounted_change(move |_| owner.invalidate());
        let weak = Rc::downgrade(&state.inner);
        scope.add_disposer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.teardown();
            }
        });
    }
    state
}
