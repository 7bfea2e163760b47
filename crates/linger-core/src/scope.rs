use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

type Disposer = Box<dyn FnOnce()>;

/// Owner of one component instance.
///
/// A scope holds the values remembered while composing the instance and the
/// cleanups registered by its effects. Disposing the scope is teardown: the
/// cleanups run (children first) and remembered values are dropped.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

/// Non-owning handle to a [`Scope`], for callbacks that must not keep it alive.
#[derive(Clone)]
pub struct WeakScope(Weak<ScopeInner>);

pub(crate) struct ScopeInner {
    disposers: RefCell<SmallVec<[Disposer; 4]>>,
    children: RefCell<Vec<Scope>>,
    pub(crate) slots: RefCell<Vec<Box<dyn Any>>>,
    pub(crate) cursor: Cell<usize>,
    pub(crate) keyed_slots: RefCell<HashMap<String, Box<dyn Any>>>,
    invalidated: Cell<bool>,
    disposed: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(SmallVec::new()),
                children: RefCell::new(Vec::new()),
                slots: RefCell::new(Vec::new()),
                cursor: Cell::new(0),
                keyed_slots: RefCell::new(HashMap::new()),
                invalidated: Cell::new(false),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Makes this scope current for the duration of `f`.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let result = f();
        CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
        result
    }

    /// One composition pass: rewinds the slot cursor so the Nth `remember`
    /// call sees the Nth stored value, clears the invalidation flag, then runs
    /// `f` with this scope current.
    pub fn compose<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.cursor.set(0);
        self.inner.invalidated.set(false);
        self.run(f)
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            log::debug!("add_disposer on a disposed scope; running cleanup now");
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Marks the scope as needing recomposition.
    pub fn invalidate(&self) {
        self.inner.invalidated.set(true);
    }

    pub fn is_invalidated(&self) -> bool {
        self.inner.invalidated.get()
    }

    /// Returns and clears the invalidation flag.
    pub fn take_invalidated(&self) -> bool {
        self.inner.invalidated.replace(false)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.inner))
    }

    pub fn dispose(self) {
        self.inner.teardown();
    }
}

impl ScopeInner {
    fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }

        // Remembered values may hold handles whose Drop touches this scope.
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        let keyed = std::mem::take(&mut *self.keyed_slots.borrow_mut());
        drop(slots);
        drop(keyed);
    }
}

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(|inner| Scope { inner })
    }

    /// Invalidates the scope if it is still alive.
    pub fn invalidate(&self) {
        if let Some(inner) = self.0.upgrade()
            && !inner.disposed.get()
        {
            inner.invalidated.set(true);
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

pub(crate) fn with_current_inner<R>(f: impl FnOnce(&ScopeInner) -> R) -> Option<R> {
    let inner = CURRENT_SCOPE.with(|current| current.borrow().as_ref().and_then(Weak::upgrade))?;
    Some(f(&inner))
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}
