use anyhow::Context;
use linger_core::*;
use web_time::{Duration, Instant};

/// What the "user" does, relative to startup.
const SCRIPT: &[(u64, bool)] = &[(0, true), (400, false), (500, true), (900, false)];

fn popover(config: DelayUnmountConfig) -> (String, VisibilitySetter) {
    let (mounted, set_visible) = use_delay_unmount_with_key("popover", config);
    let out = if mounted { "[ popover ]" } else { "(nothing)" };
    (out.to_string(), set_visible)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(arg) => {
            let millis: f64 = arg
                .parse()
                .with_context(|| format!("exit delay must be a number of milliseconds, got {arg:?}"))?;
            DelayUnmountConfig::from_millis_f64(millis)?
        }
        None => DelayUnmountConfig::default(),
    };
    log::info!("Starting delay-unmount demo, exit delay {:?}", config.delay);

    let scope = Scope::new();
    let start = Instant::now();
    let render = || popover(config);

    // The setter is stable across compositions; keep the first one.
    let (out, set_visible) = scope.compose(render);
    println!("{:>6}ms  {out}", 0);

    let mut script = SCRIPT.iter().peekable();
    loop {
        let next_event = script
            .peek()
            .map(|(at, _)| start + Duration::from_millis(*at));
        let wake = match (next_event, next_deadline()) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => break,
        };
        let now = Instant::now();
        if wake > now {
            std::thread::sleep(wake - now);
        }

        let now = Instant::now();
        while let Some((_, visible)) =
            script.next_if(|(at, _)| start + Duration::from_millis(*at) <= now)
        {
            log::info!("user requests visible={visible}");
            set_visible.set(*visible);
        }
        run_due_timers();

        if scope.take_invalidated() {
            let elapsed = start.elapsed().as_millis();
            let (out, _) = scope.compose(render);
            println!("{elapsed:>6}ms  {out}");
        }
    }

    scope.dispose();
    log::info!("Done");
    Ok(())
}
