use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use tetrablast_engine::{GameSession, LockReport, ScoreSink, SessionState};

use crate::ui::widgets::{GridDisplay, StatsDisplay, color, style};

#[derive(Debug)]
pub struct SessionDisplay<'a, K>
where
    K: ScoreSink,
{
    session: &'a GameSession<K>,
    show_ghost: bool,
    horizontal_padding: u16,
}

impl<'a, K> SessionDisplay<'a, K>
where
    K: ScoreSink,
{
    pub fn new(session: &'a GameSession<K>, show_ghost: bool) -> Self {
        Self {
            session,
            show_ghost,
            horizontal_padding: 1,
        }
    }
}

/// Text for the panel below the grid, describing the latest chain.
fn chain_banner(report: &LockReport) -> Option<String> {
    if report.passes().is_empty() {
        return None;
    }
    Some(format!(
        "CHAIN x{} +{}",
        report.max_combo(),
        report.chain_score()
    ))
}

impl<K> Widget for SessionDisplay<'_, K>
where
    K: ScoreSink,
{
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let session = self.session;
        let border_style = match session.session_state() {
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        };

        let ghost = self.show_ghost.then(|| session.drop_preview()).flatten();
        let grid = GridDisplay::new(session.state().grid())
            .falling_piece(session.falling_piece().copied())
            .ghost(ghost)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let stats = StatsDisplay::new(session).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(Padding::horizontal(self.horizontal_padding))
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let grid_width = grid.width();
        let grid_height = grid.height();
        let stats_width = stats.width();
        let stats_height = stats.height();

        let [grid_column, stats_column] = Layout::horizontal([
            Constraint::Length(grid_width),
            Constraint::Length(stats_width),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [grid_area] = Layout::vertical([Constraint::Length(grid_height)]).areas(grid_column);
        let [stats_area, banner_area] = Layout::vertical([
            Constraint::Length(stats_height),
            Constraint::Length(1),
        ])
        .spacing(1)
        .areas(stats_column);

        grid.render(grid_area, buf);
        stats.render(stats_area, buf);
        if let Some(banner) = session.last_lock().and_then(chain_banner) {
            Line::styled(banner, style::CHAIN)
                .centered()
                .render(banner_area, buf);
        }

        let popup = match session.session_state() {
            SessionState::Playing => None,
            SessionState::Paused => {
                Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
            }
            SessionState::GameOver => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = grid_area.centered(Constraint::Length(grid_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
