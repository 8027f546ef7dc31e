mod clipboard;
mod help;
mod state;

use crate::cli::{build_form, Cli, RunStatus};
use crate::client::AnalyticsClient;
use crate::config::ViewerConfig;
use crate::model::Vacancy;
use crate::orchestrator::form::Action;
use crate::orchestrator::{self, Session, UiCommand, ViewEvent};
use crate::render::{vacancy_lines, ResultsArea};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::{Field, UiState};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::orchestrator::bootstrap::{LocalZone, SelectOption};

pub async fn run(args: Cli, cfg: ViewerConfig, zone: Arc<dyn LocalZone>) -> Result<RunStatus> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ViewEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let backend = Arc::new(AnalyticsClient::new(&cfg)?);
    let session = Session::new(build_form(&args), cfg.locale);

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(session, event_rx, cmd_tx));

    let res = orchestrator::run_controller(backend, zone, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res.map(|()| RunStatus::Done)
}

/// What the UI loop should do after a key press.
#[derive(Debug)]
enum Intent {
    Continue,
    Quit,
    Dispatch(UiCommand),
}

/// Run the TUI loop on a dedicated thread. `UiState` is owned here only.
fn run_threaded(
    session: Session,
    mut event_rx: UnboundedReceiver<ViewEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let _restore = TerminalGuard {
        restore: restore_terminal,
    };
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(session);
    state.info = "Loading selectors…".into();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut state, k) {
                    Intent::Continue => {}
                    Intent::Dispatch(cmd) => {
                        if cmd_tx.send(cmd).is_err() {
                            break Err(anyhow::anyhow!("controller stopped"));
                        }
                    }
                    Intent::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
                dirty = true;
            }
        }
    };

    res
}

/// Runs `restore` on drop, so raw mode is undone on every exit from the UI thread.
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
}

/// Append bootstrap options and preselect whatever the command line asked for.
fn fill_selector(selector: &mut state::Selector, options: Vec<SelectOption>, wanted: &str) {
    selector.extend(options);
    if let Some(i) = selector.options.iter().position(|o| o.value == wanted) {
        selector.selected = i;
    }
}

fn apply_event(state: &mut UiState, ev: ViewEvent) {
    match ev {
        ViewEvent::Snapshots(options) => {
            state.info = format!("{} stored result(s)", options.len());
            let wanted = state.session.form.stats_select.clone();
            fill_selector(&mut state.stats_select, options, &wanted);
        }
        ViewEvent::Defaults { texts, techs } => {
            let wanted_text = state.session.form.text_select.clone();
            let wanted_tech = state.session.form.tech_select.clone();
            fill_selector(&mut state.text_select, texts, &wanted_text);
            fill_selector(&mut state.tech_select, techs, &wanted_tech);
        }
        ViewEvent::Finished { ticket, outcome } => {
            if state.session.complete(ticket, &outcome) {
                state.results_scroll = 0;
            }
        }
    }
}

fn handle_key(state: &mut UiState, k: KeyEvent) -> Intent {
    match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => Intent::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
            state.info = match state.focused_link().map(|l| l.to_string()) {
                Some(link) => match clipboard::copy_to_clipboard(&link) {
                    Ok(()) => format!("✓ Copied to clipboard: {link}"),
                    Err(e) => format!("Clipboard copy failed: {e:#}"),
                },
                None => "No vacancy to copy".into(),
            };
            Intent::Continue
        }
        (_, KeyCode::F(1)) => {
            state.show_help = !state.show_help;
            Intent::Continue
        }
        (_, KeyCode::Tab) => {
            state.focus = state.focus.next();
            Intent::Continue
        }
        (_, KeyCode::BackTab) => {
            state.focus = state.focus.prev();
            Intent::Continue
        }
        (_, KeyCode::Left) | (_, KeyCode::Right) => {
            let forward = k.code == KeyCode::Right;
            let focus = state.focus;
            if let Some(sel) = state.selector_mut(focus) {
                sel.cycle(forward);
            }
            Intent::Continue
        }
        (_, KeyCode::Up) => {
            state.scroll(false);
            Intent::Continue
        }
        (_, KeyCode::Down) => {
            state.scroll(true);
            Intent::Continue
        }
        (_, KeyCode::Enter) => {
            state.sync_form();
            match state.session.trigger() {
                Some((ticket, action)) => {
                    state.info = match &action {
                        Action::Replay { id } => format!("Fetching stored result {id}…"),
                        Action::Search(q) => format!("Searching \"{}\" / {}…", q.search_text, q.technology),
                    };
                    Intent::Dispatch(UiCommand::Run { ticket, action })
                }
                None => Intent::Continue,
            }
        }
        (_, KeyCode::Backspace) => {
            let focus = state.focus;
            if let Some(input) = state.input_mut(focus) {
                input.pop();
            }
            Intent::Continue
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            let focus = state.focus;
            if let Some(input) = state.input_mut(focus) {
                input.push(c);
            }
            Intent::Continue
        }
        _ => Intent::Continue,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(0)].as_ref())
        .split(rows[0]);

    draw_form(cols[0], f, state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(cols[1]);
    draw_stats(right[0], f, state);
    draw_results(right[1], f, state);
    draw_status(rows[1], f, state);

    if state.show_help {
        help::draw_help(centered(area, 70, 14), f);
    }
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let fields = Field::all();
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let focused = state.focus == *field;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = state.field_text(*field);
        let shown = match field {
            Field::Stats | Field::TextSelect | Field::TechSelect => format!("‹ {value} ›"),
            _ if focused => format!("{value}▏"),
            _ => value.to_string(),
        };
        let p = Paragraph::new(shown).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(field.title()),
        );
        f.render_widget(p, chunks[i]);
    }
}

fn draw_stats(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines: Vec<Line> = state
        .session
        .screen
        .stats
        .iter()
        .map(|l| Line::from(l.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(p, area);
}

fn vacancy_block(v: &Vacancy) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (i, text) in vacancy_lines(v).into_iter().enumerate() {
        let style = match i {
            0 => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            4 => Style::default().fg(Color::Cyan),
            _ => Style::default(),
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines.push(Line::from(""));
    lines
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let locale = state.session.locale;
    let lines: Vec<Line> = match &state.session.screen.results {
        ResultsArea::Empty => Vec::new(),
        ResultsArea::Loading => vec![Line::from(Span::styled(
            locale.loading(),
            Style::default().fg(Color::Yellow),
        ))],
        ResultsArea::Error(msg) => vec![Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Red),
        ))],
        ResultsArea::Listing { header, vacancies } => {
            let mut lines = vec![
                Line::from(Span::styled(
                    header.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            for v in vacancies.iter().skip(state.results_scroll) {
                lines.extend(vacancy_block(v));
            }
            lines
        }
    };

    let total = state.vacancy_count();
    let title = if total > 0 {
        format!("Results ({}/{})", state.results_scroll + 1, total)
    } else {
        "Results".to_string()
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut spans = Vec::new();
    if state.session.is_loading() {
        spans.push(Span::styled("● ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::raw(state.info.clone()));
    spans.push(Span::raw("   "));
    spans.push(Span::styled("F1", Style::default().fg(Color::Magenta)));
    spans.push(Span::raw(" help"));
    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("hh-viewer"));
    f.render_widget(p, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::locale::Locale;
    use crate::orchestrator::form::FormState;
    use std::cell::Cell;

    fn failing_setup(restored: &Cell<bool>) -> Result<()> {
        let _restore = TerminalGuard {
            restore: || restored.set(true),
        };
        let _size: u16 = "not a size".parse().context("create terminal")?;
        Ok(())
    }

    #[test]
    fn terminal_is_restored_when_setup_fails() {
        let restored = Cell::new(false);
        assert!(failing_setup(&restored).is_err());
        assert!(restored.get());
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> UiState {
        UiState::new(Session::new(FormState::default(), Locale::En))
    }

    fn type_into(state: &mut UiState, field: Field, text: &str) {
        state.focus = field;
        if let Some(input) = state.input_mut(field) {
            input.clear();
        }
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_with_empty_form_shows_validation_error() {
        let mut s = state();
        assert!(matches!(
            handle_key(&mut s, key(KeyCode::Enter)),
            Intent::Continue
        ));
        assert_eq!(
            s.session.screen.results,
            ResultsArea::Error("no search query".into())
        );
    }

    #[test]
    fn typed_search_dispatches_and_shows_placeholder() {
        let mut s = state();
        type_into(&mut s, Field::TextInput, "backend");
        type_into(&mut s, Field::TechInput, "go");
        type_into(&mut s, Field::Count, "10");

        let intent = handle_key(&mut s, key(KeyCode::Enter));

        match intent {
            Intent::Dispatch(UiCommand::Run { action, .. }) => match action {
                Action::Search(q) => {
                    assert_eq!(q.search_text, "backend");
                    assert_eq!(q.technology, "go");
                    assert_eq!(q.count, 10);
                }
                other => panic!("expected search, got {other:?}"),
            },
            other => panic!("expected dispatch, got {other:?}"),
        }
        assert_eq!(s.session.screen.results, ResultsArea::Loading);
        assert!(s.session.is_loading());
    }

    #[test]
    fn chosen_snapshot_wins_over_typed_fields() {
        let mut s = state();
        apply_event(
            &mut s,
            ViewEvent::Snapshots(vec![SelectOption {
                value: "1700000000".into(),
                label: "2023-11-14 22:13:20".into(),
            }]),
        );
        s.focus = Field::Stats;
        handle_key(&mut s, key(KeyCode::Right));
        type_into(&mut s, Field::Count, "500");

        match handle_key(&mut s, key(KeyCode::Enter)) {
            Intent::Dispatch(UiCommand::Run {
                action: Action::Replay { id },
                ..
            }) => assert_eq!(id, "1700000000"),
            other => panic!("expected replay, got {other:?}"),
        }
    }

    #[test]
    fn finished_event_for_stale_ticket_is_ignored() {
        let mut s = state();
        type_into(&mut s, Field::TextInput, "backend");
        type_into(&mut s, Field::TechInput, "go");
        let Intent::Dispatch(UiCommand::Run { ticket: first, .. }) =
            handle_key(&mut s, key(KeyCode::Enter))
        else {
            panic!("expected dispatch");
        };
        let Intent::Dispatch(UiCommand::Run { ticket: second, .. }) =
            handle_key(&mut s, key(KeyCode::Enter))
        else {
            panic!("expected dispatch");
        };

        apply_event(
            &mut s,
            ViewEvent::Finished {
                ticket: second,
                outcome: Box::new(Err(DispatchError::Backend("new".into()))),
            },
        );
        apply_event(
            &mut s,
            ViewEvent::Finished {
                ticket: first,
                outcome: Box::new(Err(DispatchError::Backend("old".into()))),
            },
        );
        assert_eq!(s.session.screen.results, ResultsArea::Error("Error: new".into()));
    }

    #[test]
    fn command_line_selection_is_preselected_after_bootstrap() {
        let mut s = UiState::new(Session::new(
            FormState {
                tech_select: "rust".into(),
                ..Default::default()
            },
            Locale::En,
        ));
        apply_event(
            &mut s,
            ViewEvent::Defaults {
                texts: Vec::new(),
                techs: vec![
                    SelectOption {
                        value: "go".into(),
                        label: "go".into(),
                    },
                    SelectOption {
                        value: "rust".into(),
                        label: "rust".into(),
                    },
                ],
            },
        );
        assert_eq!(s.tech_select.current().value, "rust");
    }

    #[test]
    fn ctrl_c_quits() {
        let mut s = state();
        let k = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(handle_key(&mut s, k), Intent::Quit));
    }
}
