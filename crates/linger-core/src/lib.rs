//! # Delayed unmount on a small reactive core
//!
//! linger keeps an element in the render tree long enough for its exit
//! transition to finish. The helper, [`DelayUnmount`], sits on a tiny
//! single‑threaded runtime:
//!
//! - `Signal<T>` — observable value with subscriptions.
//! - `Scope` — owner of one component instance; `remember*` stores state in it.
//! - `effect` / `KeyedEffect` — side‑effects with cleanup.
//! - `set_timeout` / `run_due_timers` — deferred callbacks pumped by the host.
//!
//! ## Signals
//!
//! ```rust
//! use linger_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Composing with a scope
//!
//! A component instance is a `Scope`. Each render is one `compose` pass; the
//! Nth `remember` call in a pass sees the Nth stored value. Disposing the scope
//! is teardown.
//!
//! ```rust
//! use linger_core::*;
//! use std::time::Duration;
//!
//! set_clock(ManualClock::new());
//!
//! let dialog = Scope::new();
//! let render = || use_delay_unmount(Duration::from_millis(300), false, false);
//!
//! let (mounted, set_visible) = dialog.compose(render);
//! assert!(!mounted);
//!
//! set_visible.set(true);
//! assert!(dialog.take_invalidated());
//! let (mounted, _) = dialog.compose(render);
//! assert!(mounted);
//!
//! dialog.dispose();
//! assert!(!set_visible.is_live());
//! ```
//!
//! ## Driving time
//!
//! Timers never fire by themselves. The host calls [`run_due_timers`] from its
//! event loop, and can sleep until [`next_deadline`] when idle. Tests install a
//! [`ManualClock`] with [`set_clock`] and advance it explicitly.

pub mod clock;
pub mod config;
pub mod delay_unmount;
pub mod effects;
pub mod effects_ext;
pub mod error;
pub mod locals;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod tests;
pub mod timer;

pub use clock::*;
pub use config::*;
pub use delay_unmount::*;
pub use effects::*;
pub use effects_ext::*;
pub use locals::*;
pub use prelude::*;
pub use signal::*;
pub use timer::*;
