use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    Tick,
    Render,
    Crossterm(CrosstermEvent),
}
