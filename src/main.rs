use anyhow::Result;
use log::{info, warn};
use rand::Rng;
use reveal::app::{check_spring, Page, PageEvent};
use reveal::config::Config;
use reveal::host::FrameLoop;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting reveal...");

    let config = Config::load().unwrap_or_else(|err| {
        warn!("Could not load config, using defaults: {err:#}");
        Config::default()
    });
    check_spring(config.spring);

    let mut frames = FrameLoop::new(config.fps_cap)?;
    let clock = frames.clock();
    let interval = frames.interval();
    let demo = config.demo.clone();

    let mut page = Page::new(config)?;
    page.mount(&frames.handle())?;

    let mut rng = rand::thread_rng();
    let mut last_frame = clock.now();
    let mut frame_count: u64 = 0;
    let report_every = (1.0 / interval.as_secs_f32()).round().max(1.0) as u64;

    // Main loop
    info!("Scrolling for {:.1}s at {}px/s", demo.duration, demo.scroll_speed);
    while clock.now() < demo.duration {
        frames.dispatch(Some(interval))?;

        let now = clock.now();
        let dt = now - last_frame;
        last_frame = now;

        let jitter = if demo.jitter > 0.0 {
            rng.gen_range(-demo.jitter..=demo.jitter)
        } else {
            0.0
        };
        page.handle_event(PageEvent::Scroll {
            delta: demo.scroll_speed * dt + jitter,
        });
        page.update(now);

        frame_count += 1;
        if frame_count % report_every == 0 {
            info!("t={now:.1}s\n  {}", page.summary());
        }
    }

    info!("Final state after {frame_count} frames\n  {}", page.summary());
    page.unmount();
    if page.hub().listener_count() != 0 {
        warn!("Scroll listeners leaked: {}", page.hub().listener_count());
    }
    Ok(())
}
