use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};

use football_scores::config::Config;
use football_scores::labels::{league_name, match_day_label, score_text, team_crest};
use football_scores::persist;
use football_scores::provider::spawn_provider;
use football_scores::state::{self, AppState, DialogButton, ProviderCommand};
use football_scores::widget::render_today;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let mut state = AppState::new(Local::now().date_naive());
        persist::load_into_state(&mut state);
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.offline_dialog.is_some() {
            self.on_dialog_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::Left => {
                if self.state.prev_day() {
                    self.request_day();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.state.next_day() {
                    self.request_day();
                }
            }
            KeyCode::Char('t') | KeyCode::Home => {
                if self.state.jump_to_today() {
                    self.request_day();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => self.state.toggle_detail(),
            KeyCode::Char('s') => match self.state.share_selected() {
                Some(text) => self.state.push_log(format!("[SHARE] {text}")),
                None => self.state.push_log("[INFO] No match selected to share"),
            },
            KeyCode::Char('r') => self.request_refresh(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h')
            | KeyCode::Char('l') => self.state.toggle_dialog_focus(),
            KeyCode::Enter => match self.state.offline_dialog {
                Some(DialogButton::Retry) => self.retry(),
                _ => self.state.dismiss_dialog(),
            },
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char('o') | KeyCode::Esc => self.state.dismiss_dialog(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn retry(&mut self) {
        self.state.dismiss_dialog();
        self.request_refresh(true);
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state
                .push_log(format!("[INFO] {what} unavailable"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
            return false;
        }
        true
    }

    fn request_refresh(&mut self, announce: bool) {
        if self.send(ProviderCommand::Refresh, "Refresh") && announce {
            self.state.push_log("[INFO] Refresh requested");
        }
    }

    fn request_day(&mut self) {
        let date = self.state.current_day_key();
        self.send(ProviderCommand::LoadDay { date }, "Day load");
    }

    fn request_today(&mut self) {
        self.send(ProviderCommand::LoadToday, "Today panel");
    }

    fn maybe_roll_day(&mut self) {
        if self.state.roll_today(Local::now().date_naive()) {
            self.request_day();
            self.request_today();
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_provider(config, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    app.request_day();
    app.request_today();
    let res = run_app(&mut terminal, &mut app, rx);
    persist::save_from_state(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            state::apply_delta(&mut app.state, delta);
        }
        if app.state.take_reload() {
            app.request_day();
            app.request_today();
        }
        app.maybe_roll_day();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], &app.state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(chunks[1]);
    render_scores(frame, body[0], &app.state);
    render_today_panel(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(focus) = app.state.offline_dialog {
        render_offline_dialog(frame, frame.size(), focus);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(area);

    let status = if state.refreshing {
        "Refreshing...".to_string()
    } else {
        match &state.last_refresh {
            Some(at) => format!("Updated {at}"),
            None => "Not updated yet".to_string(),
        }
    };
    let title = format!(
        " FOOTBALL SCORES | {} | {}",
        state.current_day_key(),
        status
    );
    frame.render_widget(
        Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    let tabs = Tabs::new(state.page_labels())
        .select(state.day_page)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, rows[1]);
}

fn render_scores(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Scores").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.matches.is_empty() {
        let text = if state.matches_date.is_none() {
            "Loading..."
        } else {
            "No matches for this day"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_span = (0usize, 1usize);
    for (idx, m) in state.matches.iter().enumerate() {
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let start = lines.len();

        lines.push(Line::from(vec![
            Span::styled(format!("{:<6}", m.time), row_style.fg(Color::Cyan)),
            Span::styled(format!("[{:<3}] ", team_crest(&m.home)), row_style),
            Span::styled(format!("{:<24}", truncate(&m.home, 24)), row_style),
            Span::styled(
                format!("{:^9}", score_text(m.home_goals, m.away_goals)),
                row_style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{:<24}", truncate(&m.away, 24)), row_style),
            Span::styled(format!(" [{:<3}]", team_crest(&m.away)), row_style),
        ]));

        if state.is_detail_open(m.match_id) {
            let detail_style = Style::default().fg(Color::Yellow);
            lines.push(Line::from(Span::styled(
                format!(
                    "      {} | {}",
                    match_day_label(m.match_day, m.league_id),
                    league_name(m.league_id)
                ),
                detail_style,
            )));
            lines.push(Line::from(Span::styled(
                "      s Share",
                Style::default().fg(Color::DarkGray),
            )));
        }

        if selected {
            selected_span = (start, lines.len() - start);
        }
    }

    let visible = inner.height as usize;
    let (start, height) = selected_span;
    let scroll = (start + height).saturating_sub(visible);
    let list = Paragraph::new(lines).scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(list, inner);
}

fn render_today_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = render_today(state.today_summary.as_ref()).join("\n");
    let panel = Paragraph::new(text)
        .block(Block::default().title("Today").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.offline_dialog.is_some() {
        return "Tab Switch | Enter Select | r Retry | Esc OK | q Quit".to_string();
    }
    "h/l/←/→ Day | t Today | j/k/↑/↓ Move | Enter/d Details | s Share | r Refresh | ? Help | q Quit"
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn render_offline_dialog(frame: &mut Frame, area: Rect, focus: DialogButton) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let focused = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);
    let plain = Style::default();
    let (retry_style, ok_style) = match focus {
        DialogButton::Retry => (focused, plain),
        DialogButton::Ok => (plain, focused),
    };

    let lines = vec![
        Line::from("No network connection."),
        Line::from("Scores shown are from the last successful refresh."),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Retry ", retry_style),
            Span::raw("   "),
            Span::styled(" OK ", ok_style),
        ]),
    ];
    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("No network")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(dialog, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Football Scores - Help",
        "",
        "Days:",
        "  h / ←        Previous day",
        "  l / →        Next day",
        "  t / Home     Today",
        "",
        "Scores:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Toggle match details",
        "  s            Share selected match",
        "  r            Refresh from feed",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
