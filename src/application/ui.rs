use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::OutputPanel;
use crate::domain::models::Prompts;
use crate::domain::models::UiState;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Focus;

fn render_button<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let mut label = " Generate ";
    if app_state.ui_state.is_busy() {
        label = " Working... ";
    }

    let mut style = Style::default().fg(Color::Blue);
    if app_state.focus == Focus::GenerateButton {
        style = Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD);
    }

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("[{label}]"), style),
        Span::styled(
            "   Tab: next field  Ctrl+G: generate  Ctrl+C: exit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), rect);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let output_panel = OutputPanel::default();
    let mut events = EventsService::new(rx);

    #[cfg(feature = "dev")]
    app_state.type_str(" Keep it under three sentences.");

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(6),
                    Constraint::Length(6),
                    Constraint::Length(1),
                    Constraint::Min(3),
                ])
                .split(frame.size());

            frame.render_widget(app_state.system_prompt.widget(), layout[0]);
            frame.render_widget(app_state.user_request.widget(), layout[1]);
            render_button(frame, layout[2], app_state);
            output_panel.render(frame, layout[3], &app_state.ui_state);
        })?;

        let event = events.next().await?;
        if app_state.handle_event(event, &tx)? {
            break;
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
    prompts: Prompts,
    initial_state: UiState,
) -> Result<()> {
    let mut stdout = io::stdout();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new(prompts, initial_state);

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
