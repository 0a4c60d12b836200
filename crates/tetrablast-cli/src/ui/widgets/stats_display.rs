use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use tetrablast_engine::{GameSession, ScoreSink};

use crate::ui::widgets::style;

pub struct StatsDisplay<'a, K>
where
    K: ScoreSink,
{
    session: &'a GameSession<K>,
    block: Option<BlockWidget<'a>>,
}

impl<'a, K> StatsDisplay<'a, K>
where
    K: ScoreSink,
{
    pub fn new(session: &'a GameSession<K>) -> Self {
        Self {
            session,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(row_count()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }

    fn rows(&self) -> Vec<Row> {
        let session = self.session;
        let stats = session.stats();
        let dur = session.duration();
        vec![
            Row::FullLabel("SCORE:"),
            Row::FullValue(stats.score().to_string()),
            Row::FullLabel("BEST:"),
            Row::FullValue(session.best_score().to_string()),
            Row::FullLabel("TIME:"),
            Row::FullValue(format!(
                "{:0}:{:0>2}.{:0>2}",
                dur.as_secs() / 60,
                dur.as_secs() % 60,
                dur.subsec_millis() / 10
            )),
            Row::Empty,
            Row::LabelValue("PIECES:", stats.locked_pieces().to_string()),
            Row::LabelValue("ROWS:", stats.total_cleared_rows().to_string()),
            Row::LabelValue("EXPLODED:", stats.exploded_cells().to_string()),
            Row::LabelValue("CHAINS:", stats.chains().to_string()),
            Row::LabelValue("LONGEST:", stats.longest_chain().to_string()),
            Row::LabelValue("MAX COMBO:", format!("x{}", stats.max_combo())),
        ]
    }
}

const fn row_count() -> usize {
    13
}

enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(String),
    LabelValue(&'static str, String),
}

impl<K> Widget for StatsDisplay<'_, K>
where
    K: ScoreSink,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let rows = self.rows();
        let row_areas = Layout::vertical(rows.iter().map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(rows, row_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value, style).right_aligned().render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value, style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tetrablast_engine::{PieceSeed, SessionConfig};

    use super::*;

    #[test]
    fn test_height_matches_rows() {
        let session = GameSession::new(
            SessionConfig::default(),
            PieceSeed::from_bytes([1; 16]),
            Vec::<usize>::new(),
        );
        let display = StatsDisplay::new(&session);
        assert_eq!(display.rows().len(), row_count());
        assert_eq!(usize::from(display.height()), row_count());
    }
}
