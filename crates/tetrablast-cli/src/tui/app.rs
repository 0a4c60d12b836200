use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::RenderMode;

/// An application driven by [`run`](super::run).
///
/// The clock settings are read again after every event, so an app can stop
/// ticking while nothing moves on screen.
pub trait App {
    /// Time between ticks, or `None` to stop ticking.
    fn tick_interval(&self) -> Option<Duration>;

    fn render_mode(&self) -> RenderMode {
        RenderMode::OnDirty
    }

    fn should_exit(&self) -> bool;

    /// Key input, mouse and resize events.
    fn handle_event(&mut self, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Called on every tick.
    fn update(&mut self);
}
