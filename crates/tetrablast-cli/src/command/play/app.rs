use std::time::Duration;

use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use tetrablast_engine::{GameSession, SessionState};

use crate::{
    command::play::FPS,
    receipt::ReceiptLog,
    tui::{App, RenderMode},
    ui::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑", "X"], "Rotate"),
    (&["Space"], "Hard Drop"),
    (&["P"], "Pause"),
    (&["R"], "Restart"),
    (&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[(&["P"], "Resume"), (&["R"], "Restart"), (&["Q"], "Quit")];
const GAME_OVER_KEYS: &[KeyBinding] = &[(&["R"], "Restart"), (&["Q"], "Quit")];

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession<ReceiptLog>,
    show_ghost: bool,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(session: GameSession<ReceiptLog>, show_ghost: bool) -> Self {
        Self {
            session,
            show_ghost,
            is_exiting: false,
        }
    }

    pub fn into_session(self) -> GameSession<ReceiptLog> {
        self.session
    }

    fn is_playing(&self) -> bool {
        !self.is_exiting && self.session.session_state().is_playing()
    }

    fn handle_key(&mut self, code: KeyCode) {
        let is_playing = self.is_playing();
        let is_over = self.session.session_state().is_game_over();
        match code {
            KeyCode::Left if is_playing => _ = self.session.try_move_left(),
            KeyCode::Right if is_playing => _ = self.session.try_move_right(),
            KeyCode::Down if is_playing => _ = self.session.try_soft_drop(),
            KeyCode::Up | KeyCode::Char('x') if is_playing => _ = self.session.try_rotate(),
            KeyCode::Char(' ') if is_playing => self.session.hard_drop_and_complete(),
            KeyCode::Char('p') if !is_over => self.session.toggle_pause(),
            KeyCode::Char('r') => self.session.restart(),
            KeyCode::Char('q') => self.is_exiting = true,
            _ => {}
        }
    }
}

impl App for PlayApp {
    /// The frame clock only runs while a game is in play.
    fn tick_interval(&self) -> Option<Duration> {
        self.is_playing().then(|| Duration::from_secs(1) / FPS)
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::throttled_from_rate(f64::from(FPS))
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, event: Event) {
        if let Some(key) = event.as_key_press_event() {
            self.handle_key(key.code);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let keys = match self.session.session_state() {
            SessionState::Playing => PLAYING_KEYS,
            SessionState::Paused => PAUSED_KEYS,
            SessionState::GameOver => GAME_OVER_KEYS,
        };
        let display = SessionDisplay::new(&self.session, self.show_ghost);
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(display, main_area);
        frame.render_widget(KeyBindingDisplay::new(keys), help_area);
    }

    fn update(&mut self) {
        if self.is_exiting {
            return;
        }
        self.session.increment_frame();
    }
}
