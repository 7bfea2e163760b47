#[cfg(test)]
mod tests {
    use crate::clock::*;
    use crate::config::*;
    use crate::delay_unmount::*;
    use crate::effects::*;
    use crate::effects_ext::KeyedEffect;
    use crate::error::ConfigError;
    use crate::locals::*;
    use crate::runtime::*;
    use crate::scope::*;
    use crate::signal::*;
    use crate::timer::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use web_time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn manual_clock() -> ManualClock {
        let clock = ManualClock::new();
        set_clock(clock.clone());
        clock
    }

    fn advance(clock: &ManualClock, by: Duration) -> usize {
        clock.advance(by);
        run_due_timers()
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert_eq!(sig.with(|v| *v * 2), 202);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let id = sig.subscribe({
            let seen = seen.clone();
            move |v| seen.borrow_mut().push(*v)
        });

        sig.set(42);
        assert!(!sig.set_if_changed(42));
        assert!(sig.set_if_changed(7));
        assert_eq!(*seen.borrow(), vec![42, 7]);

        assert_eq!(sig.subscriber_count(), 1);
        assert!(sig.unsubscribe(id));
        assert!(!sig.unsubscribe(id));
        assert_eq!(sig.subscriber_count(), 0);
        sig.set(1);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_signal_subscriber_can_write_back() {
        let sig = signal(0);
        let s2 = sig.clone();
        sig.subscribe(move |v| {
            if *v < 3 {
                s2.set(*v + 1);
            }
        });
        sig.set(1);
        assert_eq!(sig.get(), 3);
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let d = on_unmount({
            let count = count.clone();
            move || count.set(count.get() + 1)
        });
        let d2 = d.clone();
        assert!(!d.is_spent());
        d.run();
        d2.run();
        assert_eq!(count.get(), 1);
        assert!(d2.is_spent());
        assert!(Dispose::noop().is_spent());
    }

    #[test]
    fn test_effect_registers_on_scope() {
        let cleaned = Rc::new(Cell::new(false));
        let scope = Scope::new();
        scope.run(|| {
            let cleaned = cleaned.clone();
            effect(move || on_unmount(move || cleaned.set(true)));
        });
        assert!(!cleaned.get());
        scope.dispose();
        assert!(cleaned.get());
    }

    #[test]
    fn test_keyed_effect_cleans_up_before_rerun() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let fx = KeyedEffect::new();

        let run = |key: u32| {
            let log = log.clone();
            fx.run(key, move |k| {
                log.borrow_mut().push(format!("run {k}"));
                let k = *k;
                on_unmount(move || log.borrow_mut().push(format!("cleanup {k}")))
            })
        };

        assert!(run(1));
        assert!(!run(1));
        assert!(run(2));
        fx.dispose();
        assert!(!fx.has_cleanup());
        assert_eq!(
            *log.borrow(),
            vec!["run 1", "cleanup 1", "run 2", "cleanup 2"]
        );
    }

    #[test]
    fn test_keyed_effect_superseded_run_cleans_itself() {
        let fx = Rc::new(KeyedEffect::new());
        let cleaned = Rc::new(RefCell::new(Vec::new()));

        let fx2 = fx.clone();
        let c2 = cleaned.clone();
        fx.run(1, move |_| {
            let c3 = c2.clone();
            fx2.run(2, move |_| on_unmount(move || c3.borrow_mut().push(2)));
            let c2 = c2.clone();
            on_unmount(move || c2.borrow_mut().push(1))
        });

        // The outer run was superseded, so its cleanup already ran and the
        // inner one is the outstanding cleanup.
        assert_eq!(*cleaned.borrow(), vec![1]);
        assert_eq!(fx.last_key(), Some(2));
        assert!(fx.has_cleanup());
        fx.dispose();
        assert_eq!(*cleaned.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope = Scope::new();
        let child = scope.child();
        child.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("child")
        });
        scope.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("parent")
        });

        let handle = scope.clone();
        scope.dispose();
        assert!(handle.is_disposed());
        assert!(child.is_disposed());
        assert_eq!(*order.borrow(), vec!["child", "parent"]);

        // Late disposers run immediately.
        let late = Rc::new(Cell::new(false));
        handle.add_disposer({
            let late = late.clone();
            move || late.set(true)
        });
        assert!(late.get());
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned = Rc::new(Cell::new(false));
        {
            let scope = Scope::new();
            let cleaned = cleaned.clone();
            scope.add_disposer(move || cleaned.set(true));
        }
        assert!(cleaned.get());
    }

    #[test]
    fn test_remember_is_slot_based() {
        let scope = Scope::new();
        let inits = Rc::new(Cell::new(0));

        let render = || {
            let a = remember(|| {
                inits.set(inits.get() + 1);
                Cell::new(1)
            });
            let b = remember_state(|| String::from("b"));
            (a, b)
        };

        let (a1, b1) = scope.compose(render);
        a1.set(5);
        b1.borrow_mut().push('!');
        let (a2, b2) = scope.compose(render);

        assert_eq!(inits.get(), 1);
        assert_eq!(a2.get(), 5);
        assert_eq!(*b2.borrow(), "b!");
    }

    #[test]
    fn test_key_based_remember() {
        let scope = Scope::new();
        scope.run(|| {
            let val1 = remember_with_key("test", || 42);
            let val2 = remember_with_key("test", || 100);

            // Should return the same instance
            assert_eq!(*val1, 42);
            assert_eq!(*val2, 42); // Not 100, because key exists

            assert!(forget_key("test"));
            let val3 = remember_with_key("test", || 100);
            assert_eq!(*val3, 100);
        });
    }

    #[test]
    fn test_remember_outside_scope_is_not_retained() {
        let a = remember(|| Cell::new(1));
        a.set(2);
        let b = remember(|| Cell::new(1));
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let clock = manual_clock();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let order = order.clone();
            set_timeout(ms(delay), move || order.borrow_mut().push(tag));
        }
        assert_eq!(pending_timers(), 4);
        assert_eq!(next_deadline(), Some(clock.now() + ms(10)));

        assert_eq!(advance(&clock, ms(9)), 0);
        assert_eq!(advance(&clock, ms(11)), 3);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b"]);
        assert_eq!(advance(&clock, ms(10)), 1);
        assert_eq!(pending_timers(), 0);
        assert_eq!(next_deadline(), None);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let clock = manual_clock();
        let fired = Rc::new(Cell::new(false));

        let handle = set_timeout(ms(5), {
            let fired = fired.clone();
            move || fired.set(true)
        });
        assert!(handle.is_pending());
        assert!(handle.cancel());
        assert!(!handle.cancel());
        advance(&clock, ms(10));
        assert!(!fired.get());
    }

    #[test]
    fn test_timer_callback_may_cancel_a_later_one() {
        let clock = manual_clock();
        let fired = Rc::new(Cell::new(0));

        let second = set_timeout(ms(2), {
            let fired = fired.clone();
            move || fired.set(fired.get() + 10)
        });
        set_timeout(ms(1), {
            let fired = fired.clone();
            move || {
                fired.set(fired.get() + 1);
                second.cancel();
            }
        });

        advance(&clock, ms(5));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_unrepresentable_deadline_stays_pending() {
        let clock = manual_clock();
        let fired = Rc::new(Cell::new(false));

        let handle = set_timeout(Duration::MAX, {
            let fired = fired.clone();
            move || fired.set(true)
        });
        assert!(handle.is_pending());
        assert_eq!(next_deadline(), None);
        assert_eq!(advance(&clock, ms(1_000_000)), 0);
        assert!(!fired.get());
        assert!(handle.cancel());
    }

    #[test]
    fn test_huge_delay_never_unmounts() {
        let clock = manual_clock();
        let du = DelayUnmount::new(Duration::MAX, true, false);
        assert!(du.is_mounted());
        assert!(du.has_pending_unmount());

        advance(&clock, ms(1_000_000));
        assert!(du.is_mounted());

        du.show();
        assert!(!du.has_pending_unmount());
        assert_eq!(pending_timers(), 0);
    }

    #[test]
    fn test_remount_from_listener_reaches_later_listeners() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(10, true, true);

        // Bounce straight back in when the unmount lands.
        let setter = du.setter();
        du.on_mounted_change(move |mounted| {
            if !mounted {
                setter.set(true);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        du.on_mounted_change({
            let seen = seen.clone();
            move |mounted| seen.borrow_mut().push(mounted)
        });

        du.hide();
        advance(&clock, ms(10));

        assert!(du.is_mounted());
        assert!(du.mounted_signal().with(|m| *m));
        assert!(seen.borrow().contains(&true));
        assert!(seen.borrow().contains(&false));
    }

    #[test]
    fn test_mount_is_immediate() {
        let _clock = manual_clock();
        for delay in [0, 1, 300, 10_000] {
            let du = DelayUnmount::from_millis(delay, false, false);
            du.request(true);
            assert!(du.is_mounted(), "delay {delay}");
            assert!(!du.has_pending_unmount());
        }
    }

    #[test]
    fn test_unmount_waits_for_delay() {
        let clock = manual_clock();
        for delay in [0, 1, 300] {
            let du = DelayUnmount::from_millis(delay, true, true);
            du.request(false);
            assert!(du.is_mounted());
            assert!(du.has_pending_unmount());

            if delay > 0 {
                advance(&clock, ms(delay - 1));
                assert!(du.is_mounted(), "delay {delay}");
                advance(&clock, ms(1));
            } else {
                run_due_timers();
            }
            assert!(!du.is_mounted(), "delay {delay}");
            assert!(!du.has_pending_unmount());
        }
    }

    #[test]
    fn test_rerequest_cancels_pending_unmount() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(300, true, true);

        du.hide();
        advance(&clock, ms(100));
        du.show();
        assert!(!du.has_pending_unmount());
        assert_eq!(pending_timers(), 0);

        advance(&clock, ms(1_000));
        assert!(du.is_mounted());
    }

    #[test]
    fn test_identical_requests_are_ignored() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(300, true, true);
        let flips = Rc::new(Cell::new(0));
        du.mounted_signal().subscribe({
            let flips = flips.clone();
            move |_| flips.set(flips.get() + 1)
        });

        du.request(true);
        assert_eq!(pending_timers(), 0);

        du.request(false);
        let first = du.has_pending_unmount();
        advance(&clock, ms(200));
        // A second withdrawal must not re-arm the timer from zero.
        du.request(false);
        assert_eq!(pending_timers(), 1);
        advance(&clock, ms(100));

        assert!(first);
        assert!(!du.is_mounted());
        assert_eq!(flips.get(), 1);

        du.request(false);
        assert_eq!(pending_timers(), 0);
        assert!(!du.is_mounted());
    }

    #[test]
    fn test_teardown_with_pending_timer() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(300, true, true);
        let setter = du.setter();
        let flips = Rc::new(Cell::new(0));
        du.on_mounted_change({
            let flips = flips.clone();
            move |_| flips.set(flips.get() + 1)
        });

        du.hide();
        assert_eq!(pending_timers(), 1);
        du.dispose();
        assert_eq!(pending_timers(), 0);

        advance(&clock, ms(1_000));
        setter.set(true);
        assert!(du.is_mounted());
        assert_eq!(flips.get(), 0);
        assert!(!setter.is_live());
    }

    #[test]
    fn test_drop_cancels_pending_timer() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(300, true, true);
        let setter = du.setter();
        du.hide();
        drop(du);

        assert_eq!(pending_timers(), 0);
        advance(&clock, ms(300));
        setter.set(true);
        assert!(!setter.is_live());
    }

    #[test]
    fn test_initial_values_are_evaluated() {
        let clock = manual_clock();

        let entering = DelayUnmount::from_millis(300, false, true);
        assert!(entering.is_mounted());

        let leaving = DelayUnmount::from_millis(300, true, false);
        assert!(leaving.is_mounted());
        assert!(leaving.has_pending_unmount());
        advance(&clock, ms(300));
        assert!(!leaving.is_mounted());
    }

    #[test]
    fn test_scenario_300ms() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(300, false, false);
        let (mounted, set_visible) = du.split();
        assert!(!mounted);

        set_visible.set(true);
        assert!(du.is_mounted());

        set_visible.set(false);
        advance(&clock, ms(100));
        assert!(du.is_mounted());
        advance(&clock, ms(199));
        assert!(du.is_mounted());
        advance(&clock, ms(1));
        assert!(!du.is_mounted());

        set_visible.set(true);
        set_visible.set(false);
        advance(&clock, ms(100));
        set_visible.set(true);
        advance(&clock, ms(200));
        assert!(du.is_mounted());
        advance(&clock, ms(10_000));
        assert!(du.is_mounted());
    }

    #[test]
    fn test_toggle_and_reentrant_subscriber() {
        let clock = manual_clock();
        let du = DelayUnmount::from_millis(50, false, false);

        // Hide again as soon as it mounts.
        let setter = du.setter();
        du.mounted_signal().subscribe(move |m| {
            if *m {
                setter.set(false);
            }
        });

        du.toggle();
        assert!(du.is_mounted());
        assert!(!du.is_requested());
        assert!(du.has_pending_unmount());
        advance(&clock, ms(50));
        assert!(!du.is_mounted());
        assert_eq!(pending_timers(), 0);
    }

    #[test]
    fn test_use_delay_unmount_in_scope() {
        let clock = manual_clock();
        let scope = Scope::new();
        let render = || use_delay_unmount(ms(300), false, false);

        let (mounted, set_visible) = scope.compose(render);
        assert!(!mounted);
        assert!(!scope.is_invalidated());

        set_visible.set(true);
        assert!(scope.take_invalidated());
        assert!(scope.compose(render).0);

        set_visible.set(false);
        assert!(!scope.is_invalidated());
        advance(&clock, ms(300));
        assert!(scope.take_invalidated());
        assert!(!scope.compose(render).0);

        set_visible.set(true);
        set_visible.set(false);
        scope.clone().dispose();
        assert_eq!(pending_timers(), 0);
        assert!(!set_visible.is_live());
    }

    #[test]
    fn test_use_delay_unmount_with_key_and_local_delay() {
        let clock = manual_clock();
        let scope = Scope::new();

        let render = || {
            with_exit_delay(ExitDelay(ms(40)), || {
                let keyed = use_delay_unmount_with_key(
                    "menu",
                    DelayUnmountConfig::from_millis(10).shown(),
                );
                let local = use_exit_transition(true, true);
                (keyed, local)
            })
        };

        let ((menu, set_menu), (panel, set_panel)) = scope.compose(render);
        assert!(menu && panel);

        set_menu.set(false);
        set_panel.set(false);
        advance(&clock, ms(10));
        let ((menu, _), (panel, _)) = scope.compose(render);
        assert!(!menu);
        assert!(panel);

        advance(&clock, ms(30));
        let ((_, _), (panel, _)) = scope.compose(render);
        assert!(!panel);
    }

    #[test]
    fn test_exit_delay_local_defaults() {
        assert_eq!(exit_delay(), ExitDelay(DEFAULT_EXIT_DELAY));
        with_exit_delay(ExitDelay(ms(5)), || {
            assert_eq!(exit_delay().0, ms(5));
            with_exit_delay(ExitDelay(ms(6)), || assert_eq!(exit_delay().0, ms(6)));
            assert_eq!(exit_delay().0, ms(5));
        });
        assert_eq!(exit_delay().0, DEFAULT_EXIT_DELAY);
    }

    #[test]
    fn test_config_from_millis_f64() {
        assert_eq!(
            DelayUnmountConfig::from_millis_f64(250.0).unwrap().delay,
            ms(250)
        );
        assert_eq!(
            DelayUnmountConfig::from_millis_f64(-5.0).unwrap().delay,
            Duration::ZERO
        );
        assert!(matches!(
            DelayUnmountConfig::from_millis_f64(f64::NAN),
            Err(ConfigError::InvalidDelay { .. })
        ));
        assert!(DelayUnmountConfig::from_millis_f64(f64::INFINITY).is_err());

        let c = DelayUnmountConfig::fast().initially_mounted(true);
        assert_eq!(c.delay, ms(150));
        assert!(c.initially_mounted && !c.initially_requested);
        assert_eq!(DelayUnmountConfig::default().delay, ms(300));
        assert_eq!(DelayUnmountConfig::slow().delay, ms(600));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() {
        let c = DelayUnmountConfig::from_millis(120).shown();
        let json = serde_json::to_string(&c).unwrap();
        let back: DelayUnmountConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let partial: DelayUnmountConfig =
            serde_json::from_str(r#"{ "initially_requested": true }"#).unwrap();
        assert_eq!(partial.delay, DEFAULT_EXIT_DELAY);
        assert!(partial.initially_requested);
    }
}
