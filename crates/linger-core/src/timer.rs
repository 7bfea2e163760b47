//! Deferred callbacks on the host's run loop.
//!
//! Nothing fires on its own: the host calls [`run_due_timers`] from its event
//! loop (and may sleep until [`next_deadline`]). Ids are generational, so a
//! handle to a timer that already fired or was cancelled can never cancel a
//! newer one.

use std::cell::RefCell;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::clock;

new_key_type! {
    pub struct TimerId;
}

struct Entry {
    // None: the deadline is past what `Instant` can represent; never due.
    deadline: Option<Instant>,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimerQueue {
    entries: SlotMap<TimerId, Entry>,
    next_seq: u64,
}

thread_local! {
    static TIMERS: RefCell<TimerQueue> = RefCell::new(TimerQueue::default());
}

/// Handle to a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: TimerId,
}

impl TimerHandle {
    /// Cancels the callback if it has not fired yet. Returns whether it was pending.
    pub fn cancel(&self) -> bool {
        let removed = TIMERS.with(|t| t.borrow_mut().entries.remove(self.id));
        if removed.is_some() {
            log::trace!("timer {:?} cancelled", self.id);
        }
        // The callback (and whatever it captured) drops here, outside the borrow.
        removed.is_some()
    }

    pub fn is_pending(&self) -> bool {
        TIMERS.with(|t| t.borrow().entries.contains_key(self.id))
    }
}

/// Schedules `f` to run once `delay` has elapsed on the current clock.
///
/// A delay too large to add to the current instant schedules a timer that
/// stays pending (and cancellable) but never fires.
pub fn set_timeout(delay: Duration, f: impl FnOnce() + 'static) -> TimerHandle {
    let deadline = clock::now().checked_add(delay);
    if deadline.is_none() {
        log::debug!("timer delay {delay:?} overflows the clock; it will never fire");
    }
    let id = TIMERS.with(|t| {
        let mut q = t.borrow_mut();
        let seq = q.next_seq;
        q.next_seq += 1;
        q.entries.insert(Entry {
            deadline,
            seq,
            callback: Box::new(f),
        })
    });
    log::trace!("timer {id:?} armed for {delay:?}");
    TimerHandle { id }
}

/// Fires every timer whose deadline has passed, earliest first (ties in
/// scheduling order). Timers scheduled by the callbacks wait for the next
/// call. Returns how many fired.
pub fn run_due_timers() -> usize {
    let now = clock::now();
    let mut due: Vec<(Instant, u64, TimerId)> = TIMERS.with(|t| {
        t.borrow()
            .entries
            .iter()
            .filter_map(|(id, e)| match e.deadline {
                Some(deadline) if deadline <= now => Some((deadline, e.seq, id)),
                _ => None,
            })
            .collect()
    });
    due.sort_unstable_by_key(|&(deadline, seq, _)| (deadline, seq));

    let mut fired = 0;
    for (_, _, id) in due {
        // An earlier callback may have cancelled this one.
        let entry = TIMERS.with(|t| t.borrow_mut().entries.remove(id));
        if let Some(entry) = entry {
            log::trace!("timer {id:?} fired");
            (entry.callback)();
            fired += 1;
        }
    }
    fired
}

/// Earliest pending deadline, for hosts that want to sleep until it. Timers
/// that can never fire are not counted.
pub fn next_deadline() -> Option<Instant> {
    TIMERS.with(|t| t.borrow().entries.values().filter_map(|e| e.deadline).min())
}

pub fn pending_timers() -> usize {
    TIMERS.with(|t| t.borrow().entries.len())
}
