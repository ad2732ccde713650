use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use super::UiState;

#[derive(Default)]
pub struct OutputPanel {}

impl OutputPanel {
    pub fn color(state: &UiState) -> Color {
        match state {
            UiState::Idle => return Color::DarkGray,
            UiState::Loading | UiState::Generating => return Color::Blue,
            UiState::Success(_) => return Color::Green,
            UiState::Error(_) => return Color::Red,
        }
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, state: &UiState) {
        let mut alignment = Alignment::Left;
        if state.is_busy() {
            alignment = Alignment::Center;
        }

        frame.render_widget(
            Paragraph::new(state.text())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(OutputPanel::color(state)))
                        .title("Response")
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .wrap(Wrap { trim: false })
                .alignment(alignment),
            rect,
        );
    }
}
