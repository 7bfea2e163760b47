pub use crate::clock::{Clock, ManualClock, SystemClock, now, set_clock};
pub use crate::config::{DEFAULT_EXIT_DELAY, DelayUnmountConfig};
pub use crate::delay_unmount::{
    DelayUnmount, VisibilitySetter, use_delay_unmount, use_delay_unmount_with_key,
    use_exit_transition,
};
pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::KeyedEffect;
pub use crate::error::*;
pub use crate::locals::{ExitDelay, exit_delay, with_exit_delay};
pub use crate::runtime::{
    forget_key, remember, remember_state, remember_state_with_key, remember_with_key,
};
pub use crate::scope::{Scope, WeakScope, current_scope};
pub use crate::signal::{Signal, SubId, signal};
pub use crate::timer::{TimerHandle, next_deadline, pending_timers, run_due_timers, set_timeout};
