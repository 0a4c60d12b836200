use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::{App, event::TuiEvent};

/// When the screen is redrawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Redraw after every tick or terminal event.
    #[default]
    OnDirty,
    /// Redraw after a state change, at most once per interval.
    Throttled(Duration),
}

impl RenderMode {
    pub fn throttled_from_rate(rate: f64) -> Self {
        Self::Throttled(Duration::from_secs_f64(1.0 / rate))
    }
}

/// Produces tick, render and terminal events in order of their due time.
#[derive(Debug)]
struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    last_tick: Instant,
    last_render: Instant,
    dirty: bool,
}

impl EventLoop {
    fn new() -> Self {
        let now = Instant::now();
        let past = now.checked_sub(Duration::from_secs(3600)).unwrap_or(now);
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            last_tick: now,
            last_render: past,
            dirty: true, // first frame
        }
    }

    /// Applies the app's clock settings.
    ///
    /// A clock resumed from `None` starts a full interval from `now`, so a
    /// long pause does not fire a tick immediately.
    fn configure(
        &mut self,
        tick_interval: Option<Duration>,
        render_mode: RenderMode,
        now: Instant,
    ) {
        if self.tick_interval.is_none() && tick_interval.is_some() {
            self.last_tick = now;
        }
        self.tick_interval = tick_interval;
        self.render_mode = render_mode;
    }

    /// Blocks until a tick or render is due, or a terminal event arrives.
    fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= tick_interval
            {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.render_due(now) {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn render_due(&self, now: Instant) -> bool {
        match self.render_mode {
            RenderMode::OnDirty => self.dirty,
            RenderMode::Throttled(interval) => {
                self.dirty && now.duration_since(self.last_render) >= interval
            }
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_render_at = match self.render_mode {
            RenderMode::OnDirty => self.dirty.then_some(now),
            RenderMode::Throttled(interval) => self.dirty.then(|| self.last_render + interval),
        };
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}

/// Runs `app` inside the terminal until [`App::should_exit`] returns true.
///
/// Ticks call [`App::update`], renders call [`App::draw`] and terminal
/// events go to [`App::handle_event`]. The terminal is restored on return.
pub fn run<A>(app: &mut A) -> anyhow::Result<()>
where
    A: App,
{
    let mut events = EventLoop::new();
    ratatui::run(|terminal| {
        while !app.should_exit() {
            events.configure(app.tick_interval(), app.render_mode(), Instant::now());
            match events.next()? {
                TuiEvent::Tick => app.update(),
                TuiEvent::Render => {
                    terminal.draw(|frame| app.draw(frame))?;
                }
                TuiEvent::Crossterm(event) => app.handle_event(event),
            }
        }
        Ok(())
    })
}
